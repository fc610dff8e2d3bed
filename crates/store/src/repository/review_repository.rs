//! Review Repository - One final review per (student, period)

use crate::error::RepositoryError;
use shared::FinalReview;

pub trait ReviewRepository {
    /// Insert or replace the review for `(student_email, period_id)`
    fn upsert_review(&mut self, review: &FinalReview) -> Result<(), RepositoryError>;

    fn find_review(
        &self,
        student_email: &str,
        period_id: &str,
    ) -> Result<Option<FinalReview>, RepositoryError>;

    /// Reviews of one student, ordered by period id
    fn list_reviews_for_student(&self, student_email: &str) -> Result<Vec<FinalReview>, RepositoryError>;

    /// Reviews written in one period, ordered by student email
    fn list_reviews_for_period(&self, period_id: &str) -> Result<Vec<FinalReview>, RepositoryError>;

    fn delete_review(&mut self, student_email: &str, period_id: &str) -> Result<bool, RepositoryError>;
}
