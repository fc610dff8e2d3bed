//! # OKR School Roster
//!
//! Batch import sources: account and parent-link rows loaded from CSV or
//! YAML roster files, plus the report an import produces.

pub mod error;
pub mod loader;
pub mod report;
pub mod row;

pub use error::ImportError;
pub use loader::{LoadedRoster, RosterFormat, RosterLoader};
pub use report::{BatchDedup, ImportReport, InvalidRow};
pub use row::{ParentRow, UserRow};
