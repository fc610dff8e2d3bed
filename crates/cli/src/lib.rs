//! OKR School CLI library: subcommands and the shared command context

pub mod commands;
pub mod context;

pub use context::Context;
