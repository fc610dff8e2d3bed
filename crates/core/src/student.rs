//! Student operations on their own OKRs

use rbac::Permission;
use shared::{validate_value, Okr, OkrDraft, OkrError, PermissionDeniedError, Result, Role, User};
use store::SchoolStore;
use uuid::Uuid;

use crate::okr_core::OkrCore;

impl<S: SchoolStore> OkrCore<S> {
    /// Create a pending OKR in an open period
    pub fn create_okr(&mut self, token: &str, draft: OkrDraft) -> Result<Okr> {
        let student = self.authorize(token, Permission::CreateOkr)?;
        draft.validate()?;
        self.writable_period(&draft.period_id)?;

        let okr = Okr::from_draft(Uuid::new_v4().to_string(), &student.email, draft);
        self.store.insert_okr(&okr)?;

        self.record(&student, "create-okr", Some(&okr.id));
        Ok(okr)
    }

    /// Replace the content of an OKR; it goes back to pending
    pub fn update_okr(&mut self, token: &str, id: &str, draft: OkrDraft) -> Result<Okr> {
        let student = self.authorize(token, Permission::EditOwnOkr)?;
        let mut okr = self.own_okr(&student, Permission::EditOwnOkr, id)?;
        draft.validate()?;
        if draft.period_id != okr.period_id {
            return Err(OkrError::validation(format!(
                "an OKR cannot move from period '{}' to '{}'",
                okr.period_id, draft.period_id
            )));
        }
        self.writable_period(&okr.period_id)?;

        okr.apply_draft(draft);
        self.store.update_okr(&okr)?;

        self.record(&student, "update-okr", Some(&okr.id));
        Ok(okr)
    }

    /// Report progress on an OKR without sending it back for review
    pub fn update_actual(&mut self, token: &str, id: &str, actual_value: f64) -> Result<Okr> {
        let student = self.authorize(token, Permission::EditOwnOkr)?;
        let mut okr = self.own_okr(&student, Permission::EditOwnOkr, id)?;
        validate_value("actual value", actual_value)?;
        self.writable_period(&okr.period_id)?;

        okr.actual_value = actual_value;
        self.store.update_okr(&okr)?;

        self.record(&student, "update-actual", Some(&okr.id));
        Ok(okr)
    }

    /// Flag an OKR for removal by the homeroom teacher
    pub fn request_okr_deletion(&mut self, token: &str, id: &str) -> Result<Okr> {
        let student = self.authorize(token, Permission::RequestOkrDeletion)?;
        let mut okr = self.own_okr(&student, Permission::RequestOkrDeletion, id)?;

        if !okr.delete_requested {
            okr.delete_requested = true;
            self.store.update_okr(&okr)?;
        }

        self.record(&student, "request-okr-deletion", Some(&okr.id));
        Ok(okr)
    }

    /// OKRs of the calling student
    pub fn own_okrs(&mut self, token: &str, period_id: Option<&str>) -> Result<Vec<Okr>> {
        let student = self.authorize(token, Permission::ViewStudentProgress)?;
        if !student.is(Role::Student) {
            let denied = PermissionDeniedError {
                action: Permission::ViewStudentProgress.as_str().to_string(),
                role: student.role.as_str().to_string(),
                reason: "only students have OKRs of their own".to_string(),
            };
            return Err(self.deny(&student, None, denied));
        }
        let okrs = self.store.list_okrs_for_student(&student.email, period_id)?;
        self.record(&student, "view-okrs", Some(&student.email));
        Ok(okrs)
    }

    /// An OKR owned by `student`. Someone else's OKR is a denial.
    fn own_okr(&mut self, student: &User, permission: Permission, id: &str) -> Result<Okr> {
        let okr = self
            .store
            .find_okr(id)?
            .ok_or_else(|| OkrError::not_found("Okr", id))?;
        if okr.student_email != student.email {
            let denied = PermissionDeniedError {
                action: permission.as_str().to_string(),
                role: student.role.as_str().to_string(),
                reason: "only the owning student may change an OKR".to_string(),
            };
            return Err(self.deny(student, Some(id), denied));
        }
        Ok(okr)
    }
}
