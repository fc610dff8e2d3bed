//! # OKR School Audit
//!
//! Audit logging and failed-login lockout for OKR School.

mod audit_logger;
mod login_limiter;

pub use audit_logger::{AuditEntry, AuditEventType, AuditLogger, AuditStats};
pub use login_limiter::{LoginLimitResult, LoginLimiter, LoginPolicy};
