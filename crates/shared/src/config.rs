//! Configuration for OKR School
//!
//! Layers, lowest to highest priority: built-in defaults, `okr.json`,
//! `OKR_*` environment variables. The binary applies CLI flags last.

use crate::error::{OkrError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE: &str = "okr.json";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// SQLite database file (`:memory:` for a throwaway store)
    pub database: PathBuf,

    /// HTTP listen address
    pub bind: String,

    /// Failed logins allowed per email inside `failure_window_secs`
    pub max_failed_logins: usize,

    /// Window over which failed logins are counted
    pub failure_window_secs: u64,

    /// How long an email stays locked after too many failures
    pub lockout_secs: u64,

    /// Audit entries kept in memory
    pub audit_capacity: usize,

    /// How long a login token stays valid
    pub session_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("okr.db"),
            bind: "127.0.0.1:8080".to_string(),
            max_failed_logins: 5,
            failure_window_secs: 300,
            lockout_secs: 900,
            audit_capacity: 10_000,
            session_ttl_secs: 8 * 60 * 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Defaults, then the file if it exists, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `OKR_*` overrides from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup("OKR_DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Some(bind) = lookup("OKR_BIND") {
            self.bind = bind;
        }
        if let Some(value) = lookup("OKR_MAX_FAILED_LOGINS") {
            self.max_failed_logins = parse_env("OKR_MAX_FAILED_LOGINS", &value)?;
        }
        if let Some(value) = lookup("OKR_FAILURE_WINDOW_SECS") {
            self.failure_window_secs = parse_env("OKR_FAILURE_WINDOW_SECS", &value)?;
        }
        if let Some(value) = lookup("OKR_LOCKOUT_SECS") {
            self.lockout_secs = parse_env("OKR_LOCKOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("OKR_AUDIT_CAPACITY") {
            self.audit_capacity = parse_env("OKR_AUDIT_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("OKR_SESSION_TTL_SECS") {
            self.session_ttl_secs = parse_env("OKR_SESSION_TTL_SECS", &value)?;
        }
        Ok(())
    }

    /// Write the configuration as pretty JSON
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| OkrError::Config(format!("{} has invalid value '{}'", key, value)))
}
