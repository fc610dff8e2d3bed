//! Import errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading a roster file. Bad rows are not errors: they end up in
/// the import report.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported roster format '{}': expected .csv, .yaml or .yml", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("No roster files match '{0}'")]
    NoMatch(String),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("YAML error in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, ImportError>;
