//! # OKR School RBAC
//!
//! Role-Based Access Control for OKR School.
//!
//! ## Components
//!
//! - `Permission` - Actions a role may be granted
//! - `RoleManager` - Role to permission matrix and permission checks
//! - `Scope` - Which classes and students a user can reach

pub mod permission;
pub mod role_manager;
pub mod scope;

pub use permission::Permission;
pub use role_manager::RoleManager;
pub use scope::Scope;
