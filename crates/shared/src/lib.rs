//! # OKR School Shared
//!
//! Common types used across all OKR School crates: the table records,
//! the four user roles, progress/rank math, errors and configuration.

pub mod config;
pub mod credential;
pub mod error;
pub mod model;
pub mod progress;
pub mod role;

// Re-exports
pub use config::*;
pub use error::*;
pub use model::*;
pub use progress::*;
pub use role::*;
