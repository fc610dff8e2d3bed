//! Student / parent link

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub student_email: String,
    pub parent_email: String,
}

impl Relationship {
    pub fn new(student_email: impl AsRef<str>, parent_email: impl AsRef<str>) -> Self {
        Self {
            student_email: super::normalize_email(student_email.as_ref()),
            parent_email: super::normalize_email(parent_email.as_ref()),
        }
    }

    pub fn involves(&self, email: &str) -> bool {
        self.student_email == email || self.parent_email == email
    }
}
