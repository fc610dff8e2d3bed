//! # OKR School Core
//!
//! `OkrCore` ties the store, the permission matrix, the audit log and the
//! session table together. Operations are grouped by who performs them.

mod admin;
mod homeroom;
mod import;
mod okr_core;
mod parent;
mod progress;
mod session;
mod student;

#[cfg(test)]
mod testing;

pub use admin::{NewUser, UserFilter};
pub use homeroom::DeleteDecision;
pub use okr_core::OkrCore;
pub use session::{Session, SessionStore};

// Re-export dependencies
pub use audit::{AuditEntry, AuditStats};
pub use rbac::{Permission, RoleManager};
pub use roster::ImportReport;
pub use store::CascadeReport;
