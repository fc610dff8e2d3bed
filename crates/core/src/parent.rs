//! Parent operations

use rbac::Permission;
use shared::{FinalReview, OkrError, Result, User};
use store::SchoolStore;

use crate::okr_core::OkrCore;

impl<S: SchoolStore> OkrCore<S> {
    /// Student accounts linked to the calling parent
    pub fn children(&mut self, token: &str) -> Result<Vec<User>> {
        let parent = self.authorize(token, Permission::ViewChildren)?;

        let mut children = Vec::new();
        for link in self.store.list_children_of(&parent.email)? {
            match self.store.find_user(&link.student_email)? {
                Some(child) => children.push(child),
                None => tracing::warn!(
                    parent = %parent.email,
                    student = %link.student_email,
                    "link to a missing student"
                ),
            }
        }

        self.record(&parent, "view-children", None);
        Ok(children)
    }

    /// Write the parent side of a child's final review
    pub fn write_parent_comment(
        &mut self,
        token: &str,
        student: &str,
        period_id: &str,
        comment: &str,
    ) -> Result<FinalReview> {
        let parent = self.authorize(token, Permission::WriteParentComment)?;
        let student = self.student_in_scope(&parent, Permission::WriteParentComment, student)?;

        let comment = comment.trim().to_string();
        if comment.is_empty() {
            return Err(OkrError::validation("comment is empty"));
        }
        let review = self.write_review(&student.email, period_id, |r| r.parent_comment = comment)?;

        self.record(&parent, "write-parent-comment", Some(&student.email));
        Ok(review)
    }
}
