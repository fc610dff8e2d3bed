//! Repository errors

use shared::OkrError;
use thiserror::Error;

/// Errors that can occur during repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Row not found
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Key already present
    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    /// Failed to persist
    #[error("Persistence error: {message}")]
    PersistenceError { message: String },
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        Self::Duplicate {
            entity,
            key: key.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceError {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::persistence(err.to_string())
    }
}

impl From<RepositoryError> for OkrError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, key } => OkrError::NotFound { entity, key },
            RepositoryError::Duplicate { entity, key } => OkrError::Conflict { entity, key },
            RepositoryError::PersistenceError { message } => OkrError::Storage(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_okr_error() {
        let err: OkrError = RepositoryError::duplicate("User", "a@b.vn").into();
        assert!(matches!(err, OkrError::Conflict { entity: "User", .. }));

        let err: OkrError = RepositoryError::not_found("Okr", "x").into();
        assert!(matches!(err, OkrError::NotFound { .. }));

        let err: OkrError = RepositoryError::persistence("disk full").into();
        assert_eq!(err.to_string(), "Storage error: disk full");
    }
}
