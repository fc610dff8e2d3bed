//! OKR Repository - Student objectives and key results

use crate::error::RepositoryError;
use shared::Okr;

/// OKR Repository Trait
///
/// Listings keep insertion order so a student sees their OKRs in the order
/// they were entered.
pub trait OkrRepository {
    /// Insert a new OKR; fails with `Duplicate` if the id is taken
    fn insert_okr(&mut self, okr: &Okr) -> Result<(), RepositoryError>;

    /// Overwrite an existing OKR (matched by id)
    fn update_okr(&mut self, okr: &Okr) -> Result<(), RepositoryError>;

    fn find_okr(&self, id: &str) -> Result<Option<Okr>, RepositoryError>;

    /// OKRs of a student, optionally restricted to one period
    fn list_okrs_for_student(
        &self,
        student_email: &str,
        period_id: Option<&str>,
    ) -> Result<Vec<Okr>, RepositoryError>;

    /// OKRs of a student that carry a delete request
    fn list_delete_requests(&self, student_email: &str) -> Result<Vec<Okr>, RepositoryError> {
        Ok(self
            .list_okrs_for_student(student_email, None)?
            .into_iter()
            .filter(|o| o.delete_requested)
            .collect())
    }

    fn delete_okr(&mut self, id: &str) -> Result<bool, RepositoryError>;
}
