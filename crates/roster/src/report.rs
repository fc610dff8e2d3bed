//! Import outcome and in-batch deduplication

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRow {
    /// 1-based position of the row in the batch, or the file line for a
    /// line that could not be parsed
    pub row: usize,
    pub key: String,
    pub reason: String,
}

/// What an import did, row by row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: Vec<String>,
    /// Keys already in the store or earlier in the same batch
    pub skipped_duplicates: Vec<String>,
    pub invalid: Vec<InvalidRow>,
    /// Accounts created on the side (parents named by a link row)
    #[serde(default)]
    pub accounts_created: Vec<String>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.skipped_duplicates.len() + self.invalid.len()
    }

    pub fn record_invalid(&mut self, row: usize, key: impl Into<String>, reason: impl ToString) {
        self.invalid.push(InvalidRow {
            row,
            key: key.into(),
            reason: reason.to_string(),
        });
    }

    /// One-line summary for terminals and logs
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} created, {} duplicates skipped, {} invalid",
            self.created.len(),
            self.skipped_duplicates.len(),
            self.invalid.len()
        );
        if !self.accounts_created.is_empty() {
            summary.push_str(&format!(", {} new accounts", self.accounts_created.len()));
        }
        summary
    }
}

/// Keys seen so far in one batch
#[derive(Debug, Default)]
pub struct BatchDedup {
    seen: HashSet<String>,
}

impl BatchDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a key is offered
    pub fn first_time(&mut self, key: &str) -> bool {
        self.seen.insert(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_dedup() {
        let mut dedup = BatchDedup::new();
        assert!(dedup.first_time("a@school.vn"));
        assert!(dedup.first_time("b@school.vn"));
        assert!(!dedup.first_time("a@school.vn"));
    }

    #[test]
    fn test_report_summary() {
        let mut report = ImportReport::default();
        report.created.push("a@school.vn".to_string());
        report.skipped_duplicates.push("a@school.vn".to_string());
        report.record_invalid(3, "bad", "'bad' is not a valid email");

        assert_eq!(report.total(), 3);
        assert_eq!(report.summary(), "1 created, 1 duplicates skipped, 1 invalid");
        assert_eq!(report.invalid[0].row, 3);
    }

    #[test]
    fn test_report_json_shape() {
        let report = ImportReport::default();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["skippedDuplicates"].is_array());
    }
}
