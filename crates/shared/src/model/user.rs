//! User record

use crate::error::{OkrError, Result};
use crate::role::Role;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// An account, keyed by email.
///
/// `password_hash` never leaves the process: it is skipped on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,

    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub name: String,

    pub role: Role,

    /// Class a student belongs to (teachers are linked through `Class`)
    #[serde(default)]
    pub class_name: Option<String>,
}

impl User {
    pub fn new(email: impl AsRef<str>, name: impl Into<String>, role: Role) -> Self {
        Self {
            email: normalize_email(email.as_ref()),
            password_hash: String::new(),
            name: name.into(),
            role,
            class_name: None,
        }
    }

    /// Builder: set class
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Builder: set an already hashed password
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = hash.into();
        self
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

/// Partial update of a user (email and password have their own operations)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub role: Option<Role>,

    /// `Some(None)` removes the student from their class
    #[serde(default, deserialize_with = "super::double_option")]
    pub class_name: Option<Option<String>>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.class_name.is_none()
    }

    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(class_name) = self.class_name {
            user.class_name = class_name;
        }
    }
}

/// Emails are matched case-insensitively; store them trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"))
}

/// Check that an (already normalized) email looks like an address
pub fn validate_email(email: &str) -> Result<()> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(OkrError::validation(format!("'{}' is not a valid email", email)))
    }
}
