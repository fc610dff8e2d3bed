//! RosterLoader - Load roster rows from CSV/YAML files

use crate::error::{ImportError, Result};
use crate::report::{ImportReport, InvalidRow};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Supported roster file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Csv,
    Yaml,
}

impl RosterFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") => Ok(RosterFormat::Csv),
            Some("yaml") | Some("yml") => Ok(RosterFormat::Yaml),
            _ => Err(ImportError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Rows read from roster files, plus the lines that could not be parsed
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRoster<T> {
    pub rows: Vec<T>,
    /// `row` is the line in the file, `key` the file path
    pub malformed: Vec<InvalidRow>,
}

impl<T> Default for LoadedRoster<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            malformed: Vec::new(),
        }
    }
}

impl<T> LoadedRoster<T> {
    fn extend(&mut self, other: LoadedRoster<T>) {
        self.rows.extend(other.rows);
        self.malformed.extend(other.malformed);
    }

    /// Add the unparsed lines to the report of importing `rows`
    pub fn finish(self, mut report: ImportReport) -> ImportReport {
        report.invalid.extend(self.malformed);
        report
    }
}

/// Roster loader
#[derive(Debug, Default)]
pub struct RosterLoader;

impl RosterLoader {
    /// Expand a path or glob pattern into the roster files it names, sorted
    pub fn expand(pattern: &str) -> Result<Vec<PathBuf>> {
        let direct = Path::new(pattern);
        if direct.is_file() {
            return Ok(vec![direct.to_path_buf()]);
        }

        let mut paths: Vec<PathBuf> = glob::glob(pattern)?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(ImportError::NoMatch(pattern.to_string()));
        }
        Ok(paths)
    }

    /// Load every row of one file
    pub fn load<T: DeserializeOwned>(path: &Path) -> Result<LoadedRoster<T>> {
        let loaded = match RosterFormat::from_path(path)? {
            RosterFormat::Csv => Self::load_csv(path)?,
            RosterFormat::Yaml => LoadedRoster {
                rows: Self::load_yaml(path)?,
                malformed: Vec::new(),
            },
        };
        tracing::debug!(
            path = %path.display(),
            rows = loaded.rows.len(),
            malformed = loaded.malformed.len(),
            "roster file loaded"
        );
        Ok(loaded)
    }

    /// Load rows from every file matching `pattern`, in path order
    pub fn load_all<T: DeserializeOwned>(pattern: &str) -> Result<LoadedRoster<T>> {
        let mut loaded = LoadedRoster::default();
        for path in Self::expand(pattern)? {
            loaded.extend(Self::load::<T>(&path)?);
        }
        Ok(loaded)
    }

    /// A line that does not parse is reported; only I/O failures abort
    fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<LoadedRoster<T>> {
        let csv_error = |source| ImportError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_error)?;

        let mut loaded = LoadedRoster::default();
        for (index, record) in reader.deserialize::<T>().enumerate() {
            match record {
                Ok(row) => loaded.rows.push(row),
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(csv_error(e)),
                Err(e) => {
                    // Header is line 1
                    let line = e
                        .position()
                        .map(|pos| pos.line() as usize)
                        .unwrap_or(index + 2);
                    tracing::warn!(path = %path.display(), line, error = %e, "malformed roster line");
                    loaded.malformed.push(InvalidRow {
                        row: line,
                        key: path.display().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(loaded)
    }

    fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml::from_str(&content).map_err(|source| ImportError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}
