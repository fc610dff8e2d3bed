//! End-of-period review

use serde::{Deserialize, Serialize};

/// Teacher and parent comments for one student in one period.
///
/// There is at most one review per (student, period).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReview {
    pub student_email: String,
    pub period_id: String,
    #[serde(default)]
    pub teacher_comment: String,
    #[serde(default)]
    pub parent_comment: String,
    /// Set once the homeroom teacher has sent the review to the family
    #[serde(default)]
    pub sent: bool,
}

impl FinalReview {
    pub fn new(student_email: impl AsRef<str>, period_id: impl Into<String>) -> Self {
        Self {
            student_email: super::normalize_email(student_email.as_ref()),
            period_id: period_id.into(),
            teacher_comment: String::new(),
            parent_comment: String::new(),
            sent: false,
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.student_email, &self.period_id)
    }
}
