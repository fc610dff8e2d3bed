//! User Repository - Accounts keyed by email

use crate::error::RepositoryError;
use shared::{Role, User};

/// User Repository Trait
///
/// Emails are passed already normalized (see `shared::normalize_email`).
pub trait UserRepository {
    /// Insert a new user; fails with `Duplicate` if the email is taken
    fn insert_user(&mut self, user: &User) -> Result<(), RepositoryError>;

    /// Overwrite an existing user (matched by email)
    fn update_user(&mut self, user: &User) -> Result<(), RepositoryError>;

    /// Find a user by email
    fn find_user(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// All users, ordered by email
    fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// Users with a given role
    fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, RepositoryError> {
        Ok(self
            .list_users()?
            .into_iter()
            .filter(|u| u.role == role)
            .collect())
    }

    /// Users whose class is `class_name`
    fn list_users_by_class(&self, class_name: &str) -> Result<Vec<User>, RepositoryError> {
        Ok(self
            .list_users()?
            .into_iter()
            .filter(|u| u.class_name.as_deref() == Some(class_name))
            .collect())
    }

    /// Remove the user row only; returns whether a row was removed
    fn delete_user(&mut self, email: &str) -> Result<bool, RepositoryError>;

    /// Check if a user exists
    fn user_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.find_user(email)?.is_some())
    }
}
