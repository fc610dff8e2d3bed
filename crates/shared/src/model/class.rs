//! Class record

use serde::{Deserialize, Serialize};

/// A homeroom class, keyed by name (e.g. "10A1")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub name: String,

    /// Homeroom teacher (GVCN)
    #[serde(default)]
    pub teacher_email: Option<String>,

    /// Declared headcount
    #[serde(default)]
    pub size: u32,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            teacher_email: None,
            size: 0,
        }
    }

    /// Builder: set homeroom teacher
    pub fn with_teacher(mut self, email: impl AsRef<str>) -> Self {
        self.teacher_email = Some(super::normalize_email(email.as_ref()));
        self
    }

    /// Builder: set declared size
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn is_taught_by(&self, email: &str) -> bool {
        self.teacher_email.as_deref() == Some(email)
    }
}

/// Partial update of a class
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPatch {
    /// `Some(None)` clears the teacher
    #[serde(default, deserialize_with = "super::double_option")]
    pub teacher_email: Option<Option<String>>,

    #[serde(default)]
    pub size: Option<u32>,
}

impl ClassPatch {
    pub fn apply(self, class: &mut Class) {
        if let Some(teacher) = self.teacher_email {
            class.teacher_email = teacher.map(|e| super::normalize_email(&e));
        }
        if let Some(size) = self.size {
            class.size = size;
        }
    }
}
