//! # OKR School Store
//!
//! Persistence for the six school tables.
//!
//! ```text
//! Ports (repository/)     │  Adapters
//! ────────────────────────┼─────────────────────────
//! trait UserRepository    │  InMemoryStore
//! trait OkrRepository     │  SqliteStore
//! trait SchoolStore  ...  │
//! ```
//!
//! The store only enforces key uniqueness. References between tables are
//! plain strings; cascades are written out in `SchoolStore`.

pub mod error;
pub mod in_memory;
pub mod repository;
pub mod sqlite;

pub use error::RepositoryError;
pub use in_memory::InMemoryStore;
pub use repository::{
    CascadeReport, ClassRepository, OkrRepository, PeriodRepository, RelationshipRepository,
    ReviewRepository, SchoolStore, UserRepository,
};
pub use sqlite::SqliteStore;
