//! Table records
//!
//! One record type per table. Keys are plain strings matched by value;
//! the store does not enforce references between tables.

pub mod class;
pub mod okr;
pub mod period;
pub mod relationship;
pub mod review;
pub mod user;

pub use class::{Class, ClassPatch};
pub use okr::{validate_value, Okr, OkrDraft, OkrStatus};
pub use period::{Period, PeriodStatus};
pub use relationship::Relationship;
pub use review::FinalReview;
pub use user::{normalize_email, validate_email, User, UserPatch};

/// Distinguishes a missing field (`None`) from an explicit `null`
/// (`Some(None)`) in patch payloads.
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}
