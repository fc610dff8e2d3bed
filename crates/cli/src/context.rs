//! Configuration and store access shared by every subcommand

use anyhow::Context as _;
use okr_core::OkrCore;
use shared::AppConfig;
use std::path::{Path, PathBuf};
use store::SqliteStore;

#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
}

impl Context {
    /// Load `okr.json` (or `config`), then `OKR_*` variables, then flags
    pub fn load(config: Option<&Path>, database: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = AppConfig::load(config).context("failed to load configuration")?;
        if let Some(database) = database {
            config.database = database;
        }
        Ok(Self { config })
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn open_core(&self) -> anyhow::Result<OkrCore<SqliteStore>> {
        let path = &self.config.database;
        let store = SqliteStore::open(path)
            .with_context(|| format!("failed to open database {}", path.display()))?;
        Ok(OkrCore::new(store, &self.config))
    }

    /// Core plus a session acting as the first admin
    pub fn admin_session(&self) -> anyhow::Result<(OkrCore<SqliteStore>, String)> {
        let mut core = self.open_core()?;
        let session = core.local_session()?;
        Ok((core, session.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("okr.json");
        std::fs::write(&config_path, r#"{ "database": "from-file.db" }"#).unwrap();

        let ctx = Context::load(Some(&config_path), None).unwrap();
        assert_eq!(ctx.config.database, PathBuf::from("from-file.db"));

        let ctx = Context::load(Some(&config_path), Some(PathBuf::from("flag.db"))).unwrap();
        assert_eq!(ctx.config.database, PathBuf::from("flag.db"));
    }

    #[test]
    fn test_admin_session_needs_init() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::from_config(AppConfig {
            database: dir.path().join("school.db"),
            ..Default::default()
        });

        let err = ctx.admin_session().unwrap_err();
        assert!(err.to_string().contains("okr init"));
    }
}
