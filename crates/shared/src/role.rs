//! User roles

use crate::error::UnknownRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four kinds of account in the school
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Parent];

    /// Stable identifier, used in storage and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }

    /// Label shown to school staff
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Quản trị",
            Role::Teacher => "Giáo viên chủ nhiệm",
            Role::Student => "Học sinh",
            Role::Parent => "Phụ huynh",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRoleError;

    /// Accepts the English identifiers and the Vietnamese labels that show
    /// up in school roster spreadsheets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "admin" | "administrator" | "quản trị" | "quan tri" => Ok(Role::Admin),
            "teacher" | "gvcn" | "giáo viên" | "giao vien" | "giáo viên chủ nhiệm" => {
                Ok(Role::Teacher)
            }
            "student" | "hs" | "học sinh" | "hoc sinh" => Ok(Role::Student),
            "parent" | "phhs" | "phụ huynh" | "phu huynh" => Ok(Role::Parent),
            _ => Err(UnknownRoleError {
                value: s.to_string(),
                available_roles: Role::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            }),
        }
    }
}
