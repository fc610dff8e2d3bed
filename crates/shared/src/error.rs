//! Error types for OKR School

use thiserror::Error;

/// Error thrown when the acting user's role may not perform an action
#[derive(Debug, Error)]
#[error("Action '{action}' is not permitted for role '{role}': {reason}")]
pub struct PermissionDeniedError {
    pub action: String,
    pub role: String,
    pub reason: String,
}

/// Error thrown when a role label cannot be parsed
#[derive(Debug, Error)]
#[error("Unknown role '{value}'. Available roles: {}", available_roles.join(", "))]
pub struct UnknownRoleError {
    pub value: String,
    pub available_roles: Vec<String>,
}

/// General OKR School error type
#[derive(Debug, Error)]
pub enum OkrError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not logged in or session expired")]
    Unauthenticated,

    #[error(transparent)]
    PermissionDenied(#[from] PermissionDeniedError),

    #[error(transparent)]
    UnknownRole(#[from] UnknownRoleError),

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} '{key}' already exists")]
    Conflict { entity: &'static str, key: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Period '{0}' is closed")]
    PeriodClosed(String),

    #[error("Too many failed logins for '{email}', retry in {retry_after_secs}s")]
    TooManyAttempts { email: String, retry_after_secs: u64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OkrError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn conflict(entity: &'static str, key: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            key: key.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Machine-readable code, used by the HTTP layer and audit log
    pub fn code(&self) -> &'static str {
        match self {
            OkrError::InvalidCredentials => "INVALID_CREDENTIALS",
            OkrError::Unauthenticated => "UNAUTHENTICATED",
            OkrError::PermissionDenied(_) => "PERMISSION_DENIED",
            OkrError::UnknownRole(_) | OkrError::Validation(_) => "VALIDATION_ERROR",
            OkrError::NotFound { .. } => "NOT_FOUND",
            OkrError::Conflict { .. } => "CONFLICT",
            OkrError::PeriodClosed(_) => "PERIOD_CLOSED",
            OkrError::TooManyAttempts { .. } => "TOO_MANY_ATTEMPTS",
            OkrError::Storage(_) | OkrError::Io(_) | OkrError::Json(_) => "STORAGE_ERROR",
            OkrError::Config(_) => "CONFIG_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, OkrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_message() {
        let err: OkrError = PermissionDeniedError {
            action: "user.create".to_string(),
            role: "student".to_string(),
            reason: "admin only".to_string(),
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Action 'user.create' is not permitted for role 'student': admin only"
        );
        assert_eq!(err.code(), "PERMISSION_DENIED");
    }

    #[test]
    fn test_unknown_role_lists_available() {
        let err = UnknownRoleError {
            value: "janitor".to_string(),
            available_roles: vec!["admin".to_string(), "teacher".to_string()],
        };

        assert!(err.to_string().contains("admin, teacher"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(OkrError::not_found("User", "a@b.c").code(), "NOT_FOUND");
        assert_eq!(OkrError::conflict("Class", "10A1").code(), "CONFLICT");
        assert_eq!(OkrError::validation("bad").code(), "VALIDATION_ERROR");
        assert_eq!(
            OkrError::conflict("Class", "10A1").to_string(),
            "Class '10A1' already exists"
        );
    }
}
