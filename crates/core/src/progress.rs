//! Read-only views of a student, shared by every role within its scope

use rbac::Permission;
use shared::{FinalReview, Okr, Result, StudentProgress};
use store::SchoolStore;

use crate::okr_core::OkrCore;

impl<S: SchoolStore> OkrCore<S> {
    /// OKRs of a student, optionally limited to one period
    pub fn student_okrs(
        &mut self,
        token: &str,
        student: &str,
        period_id: Option<&str>,
    ) -> Result<Vec<Okr>> {
        let actor = self.authorize(token, Permission::ViewStudentProgress)?;
        let student = self.student_in_scope(&actor, Permission::ViewStudentProgress, student)?;

        let okrs = self.store.list_okrs_for_student(&student.email, period_id)?;
        self.record(&actor, "view-okrs", Some(&student.email));
        Ok(okrs)
    }

    /// Mean completion and rank of a student in one period
    pub fn student_progress(
        &mut self,
        token: &str,
        student: &str,
        period_id: &str,
    ) -> Result<StudentProgress> {
        let actor = self.authorize(token, Permission::ViewStudentProgress)?;
        let student = self.student_in_scope(&actor, Permission::ViewStudentProgress, student)?;
        let period = self.period(period_id)?;

        let percents: Vec<f64> = self
            .store
            .list_okrs_for_student(&student.email, Some(&period.id))?
            .iter()
            .map(Okr::percent)
            .collect();

        self.record(&actor, "view-progress", Some(&student.email));
        Ok(StudentProgress::from_percents(
            student.email,
            student.name,
            period.id,
            &percents,
        ))
    }

    /// The final review of a student for a period, if one was started
    pub fn final_review(
        &mut self,
        token: &str,
        student: &str,
        period_id: &str,
    ) -> Result<Option<FinalReview>> {
        let actor = self.authorize(token, Permission::ViewStudentProgress)?;
        let student = self.student_in_scope(&actor, Permission::ViewStudentProgress, student)?;

        let review = self.store.find_review(&student.email, period_id)?;
        self.record(&actor, "view-review", Some(&student.email));
        Ok(review)
    }

    /// Upsert one side of a final review
    pub(crate) fn write_review<F>(
        &mut self,
        student_email: &str,
        period_id: &str,
        edit: F,
    ) -> Result<FinalReview>
    where
        F: FnOnce(&mut FinalReview),
    {
        let period = self.period(period_id)?;
        let mut review = self
            .store
            .find_review(student_email, &period.id)?
            .unwrap_or_else(|| FinalReview::new(student_email, period.id.clone()));
        edit(&mut review);
        self.store.upsert_review(&review)?;
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{core, login};
    use shared::{OkrDraft, OkrError, Rank};

    fn draft(target: f64, actual: f64) -> OkrDraft {
        OkrDraft {
            period_id: "HK1".to_string(),
            objective: "Đọc sách".to_string(),
            key_result: "Số cuốn".to_string(),
            target_value: target,
            actual_value: actual,
            unit: "cuốn".to_string(),
        }
    }

    #[test]
    fn test_progress_is_mean_of_percents() {
        let mut core = core();
        let student = login(&mut core, "hs@school.vn");
        core.create_okr(&student, draft(10.0, 9.0)).unwrap();
        core.create_okr(&student, draft(4.0, 3.0)).unwrap();

        let progress = core.student_progress(&student, "hs@school.vn", "HK1").unwrap();
        assert_eq!(progress.okr_count, 2);
        assert!((progress.percent - 82.5).abs() < 1e-9);
        assert_eq!(progress.rank, Rank::Good);
        assert_eq!(progress.student_name, "Minh");
    }

    #[test]
    fn test_zero_target_counts_as_zero() {
        let mut core = core();
        let student = login(&mut core, "hs@school.vn");
        core.create_okr(&student, draft(0.0, 5.0)).unwrap();

        let progress = core.student_progress(&student, "hs@school.vn", "HK1").unwrap();
        assert_eq!(progress.percent, 0.0);
        assert_eq!(progress.rank, Rank::NotPassed);
    }

    #[test]
    fn test_scope_per_role() {
        let mut core = core();
        let teacher = login(&mut core, "gv@school.vn");
        let other_teacher = login(&mut core, "gv2@school.vn");
        let parent = login(&mut core, "ph@school.vn");
        let classmate = login(&mut core, "hs2@school.vn");
        let admin = login(&mut core, "admin@school.vn");

        assert!(core.student_okrs(&teacher, "hs@school.vn", None).is_ok());
        assert!(core.student_okrs(&parent, "hs@school.vn", None).is_ok());
        assert!(core.student_okrs(&admin, "hs@school.vn", None).is_ok());

        for token in [&other_teacher, &classmate] {
            assert!(matches!(
                core.student_okrs(token, "hs@school.vn", None),
                Err(OkrError::PermissionDenied(_))
            ));
        }
        assert!(matches!(
            core.student_okrs(&parent, "hs2@school.vn", None),
            Err(OkrError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_unknown_student_and_period() {
        let mut core = core();
        let admin = login(&mut core, "admin@school.vn");

        assert!(matches!(
            core.student_okrs(&admin, "gv@school.vn", None),
            Err(OkrError::NotFound { .. })
        ));
        assert!(matches!(
            core.student_progress(&admin, "hs@school.vn", "HK9"),
            Err(OkrError::NotFound { .. })
        ));
        assert!(core.final_review(&admin, "hs@school.vn", "HK1").unwrap().is_none());
    }
}
