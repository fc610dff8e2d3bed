//! Period Repository - Academic terms

use crate::error::RepositoryError;
use shared::{Period, PeriodStatus};

pub trait PeriodRepository {
    /// Insert a new period; fails with `Duplicate` if the id is taken
    fn insert_period(&mut self, period: &Period) -> Result<(), RepositoryError>;

    fn find_period(&self, id: &str) -> Result<Option<Period>, RepositoryError>;

    /// All periods, ordered by id
    fn list_periods(&self) -> Result<Vec<Period>, RepositoryError>;

    /// Open or close a period; fails with `NotFound` for an unknown id
    fn set_period_status(&mut self, id: &str, status: PeriodStatus) -> Result<(), RepositoryError>;

    fn delete_period(&mut self, id: &str) -> Result<bool, RepositoryError>;
}
