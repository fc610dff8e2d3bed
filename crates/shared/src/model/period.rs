//! Period record

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether OKRs may still be entered for a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    Open,
    Closed,
}

impl PeriodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodStatus::Open => "open",
            PeriodStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(PeriodStatus::Open),
            "closed" => Ok(PeriodStatus::Closed),
            other => Err(format!("unknown period status '{}'", other)),
        }
    }
}

/// An academic term (e.g. "HK1-2024", "Học kỳ 1")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub id: String,
    pub name: String,
    pub status: PeriodStatus,
}

impl Period {
    /// New periods start open
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into().trim().to_string(),
            name: name.into(),
            status: PeriodStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_period_is_open() {
        let period = Period::new("HK1-2024", "Học kỳ 1");
        assert!(period.is_open());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Closed".parse::<PeriodStatus>().unwrap(), PeriodStatus::Closed);
        assert!("archived".parse::<PeriodStatus>().is_err());
    }
}
