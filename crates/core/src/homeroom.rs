//! Homeroom teacher (GVCN) operations

use rbac::Permission;
use serde::{Deserialize, Serialize};
use shared::{ClassSummary, FinalReview, Okr, OkrError, OkrStatus, Result, Role, StudentProgress, User};
use store::SchoolStore;

use crate::okr_core::OkrCore;

/// Outcome of a student's request to delete an OKR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteDecision {
    /// Remove the OKR
    Approve,
    /// Keep the OKR and clear the request
    Dismiss,
}

impl<S: SchoolStore> OkrCore<S> {
    /// Students of a class, ordered by email
    pub fn list_class_students(&mut self, token: &str, class_name: &str) -> Result<Vec<User>> {
        let actor = self.authorize(token, Permission::ViewClassStudents)?;
        let class = self.class_in_scope(&actor, Permission::ViewClassStudents, class_name)?;

        let students = self
            .store
            .list_users_by_class(&class.name)?
            .into_iter()
            .filter(|u| u.is(Role::Student))
            .collect();

        self.record(&actor, "list-class-students", Some(&class.name));
        Ok(students)
    }

    pub fn approve_okr(&mut self, token: &str, id: &str) -> Result<Okr> {
        self.review_okr(token, id, OkrStatus::Approved)
    }

    pub fn reject_okr(&mut self, token: &str, id: &str) -> Result<Okr> {
        self.review_okr(token, id, OkrStatus::Rejected)
    }

    /// Record the teacher's decision on an OKR
    pub fn review_okr(&mut self, token: &str, id: &str, decision: OkrStatus) -> Result<Okr> {
        if decision == OkrStatus::Pending {
            return Err(OkrError::validation("a review decision is approved or rejected"));
        }
        let actor = self.authorize(token, Permission::ReviewOkrs)?;
        let mut okr = self.okr_in_scope(&actor, Permission::ReviewOkrs, id)?;

        okr.status = decision;
        self.store.update_okr(&okr)?;

        let action = match decision {
            OkrStatus::Approved => "approve-okr",
            _ => "reject-okr",
        };
        self.record(&actor, action, Some(&okr.id));
        Ok(okr)
    }

    /// OKRs flagged for deletion by students of the teacher's classes
    pub fn pending_delete_requests(&mut self, token: &str) -> Result<Vec<Okr>> {
        let actor = self.authorize(token, Permission::ResolveDeleteRequests)?;
        let scope = self.scope_of(&actor)?;

        let mut requests = Vec::new();
        for class_name in scope.classes() {
            for student in self.store.list_users_by_class(class_name)? {
                if student.is(Role::Student) {
                    requests.extend(self.store.list_delete_requests(&student.email)?);
                }
            }
        }

        self.record(&actor, "list-delete-requests", None);
        Ok(requests)
    }

    /// Approve (OKR removed, returns `None`) or dismiss (flag cleared) a
    /// delete request
    pub fn resolve_delete_request(
        &mut self,
        token: &str,
        id: &str,
        decision: DeleteDecision,
    ) -> Result<Option<Okr>> {
        let actor = self.authorize(token, Permission::ResolveDeleteRequests)?;
        let mut okr = self.okr_in_scope(&actor, Permission::ResolveDeleteRequests, id)?;
        if !okr.delete_requested {
            return Err(OkrError::validation(format!(
                "OKR '{}' has no pending delete request",
                id
            )));
        }

        let resolved = match decision {
            DeleteDecision::Approve => {
                self.store.delete_okr(&okr.id)?;
                None
            }
            DeleteDecision::Dismiss => {
                okr.delete_requested = false;
                self.store.update_okr(&okr)?;
                Some(okr)
            }
        };

        let action = match decision {
            DeleteDecision::Approve => "approve-delete-request",
            DeleteDecision::Dismiss => "dismiss-delete-request",
        };
        self.record(&actor, action, Some(id));
        Ok(resolved)
    }

    pub fn write_teacher_comment(
        &mut self,
        token: &str,
        student: &str,
        period_id: &str,
        comment: &str,
    ) -> Result<FinalReview> {
        let actor = self.authorize(token, Permission::WriteTeacherComment)?;
        let student = self.student_in_scope(&actor, Permission::WriteTeacherComment, student)?;

        let comment = comment.trim().to_string();
        let review = self.write_review(&student.email, period_id, |r| r.teacher_comment = comment)?;

        self.record(&actor, "write-teacher-comment", Some(&student.email));
        Ok(review)
    }

    /// Flag a final review as sent to the family
    pub fn mark_review_sent(&mut self, token: &str, student: &str, period_id: &str) -> Result<FinalReview> {
        let actor = self.authorize(token, Permission::SendReview)?;
        let student = self.student_in_scope(&actor, Permission::SendReview, student)?;

        let mut review = self
            .store
            .find_review(&student.email, period_id)?
            .ok_or_else(|| {
                OkrError::not_found("FinalReview", format!("{} / {}", student.email, period_id))
            })?;
        review.sent = true;
        self.store.upsert_review(&review)?;

        self.record(&actor, "send-review", Some(&student.email));
        Ok(review)
    }

    /// Ranked standing of every student of a class in one period
    pub fn class_summary(&mut self, token: &str, class_name: &str, period_id: &str) -> Result<ClassSummary> {
        let actor = self.authorize(token, Permission::ViewClassSummary)?;
        let class = self.class_in_scope(&actor, Permission::ViewClassSummary, class_name)?;
        let period = self.period(period_id)?;

        let mut students = Vec::new();
        for student in self.store.list_users_by_class(&class.name)? {
            if !student.is(Role::Student) {
                continue;
            }
            let percents: Vec<f64> = self
                .store
                .list_okrs_for_student(&student.email, Some(&period.id))?
                .iter()
                .map(Okr::percent)
                .collect();
            students.push(StudentProgress::from_percents(
                student.email,
                student.name,
                &period.id,
                &percents,
            ));
        }

        self.record(&actor, "view-class-summary", Some(&class.name));
        Ok(ClassSummary::new(class.name, period.id, students))
    }
}
