//! OKR record

use crate::error::{OkrError, Result};
use crate::progress::{percent_complete, Rank};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review state of an OKR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OkrStatus {
    /// New, or edited by the student since the last teacher decision
    Pending,
    Approved,
    Rejected,
}

impl OkrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OkrStatus::Pending => "pending",
            OkrStatus::Approved => "approved",
            OkrStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for OkrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OkrStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OkrStatus::Pending),
            "approved" => Ok(OkrStatus::Approved),
            "rejected" => Ok(OkrStatus::Rejected),
            other => Err(format!("unknown OKR status '{}'", other)),
        }
    }
}

/// One objective / key result pair of a student in a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Okr {
    pub id: String,
    pub student_email: String,
    pub period_id: String,
    pub objective: String,
    pub key_result: String,
    pub status: OkrStatus,
    pub target_value: f64,
    pub actual_value: f64,
    #[serde(default)]
    pub unit: String,
    /// Student asked the homeroom teacher to remove this OKR
    #[serde(default)]
    pub delete_requested: bool,
}

impl Okr {
    /// Build a pending OKR from a validated draft
    pub fn from_draft(id: impl Into<String>, student_email: impl Into<String>, draft: OkrDraft) -> Self {
        Self {
            id: id.into(),
            student_email: student_email.into(),
            period_id: draft.period_id,
            objective: draft.objective.trim().to_string(),
            key_result: draft.key_result.trim().to_string(),
            status: OkrStatus::Pending,
            target_value: draft.target_value,
            actual_value: draft.actual_value,
            unit: draft.unit.trim().to_string(),
            delete_requested: false,
        }
    }

    pub fn percent(&self) -> f64 {
        percent_complete(self.actual_value, self.target_value)
    }

    pub fn rank(&self) -> Rank {
        Rank::from_percent(self.percent())
    }

    /// Overwrite the editable fields; any edit sends the OKR back for review
    pub fn apply_draft(&mut self, draft: OkrDraft) {
        self.objective = draft.objective.trim().to_string();
        self.key_result = draft.key_result.trim().to_string();
        self.target_value = draft.target_value;
        self.actual_value = draft.actual_value;
        self.unit = draft.unit.trim().to_string();
        self.status = OkrStatus::Pending;
    }
}

/// Student input for creating or editing an OKR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkrDraft {
    pub period_id: String,
    pub objective: String,
    pub key_result: String,
    pub target_value: f64,
    #[serde(default)]
    pub actual_value: f64,
    #[serde(default)]
    pub unit: String,
}

impl OkrDraft {
    pub fn validate(&self) -> Result<()> {
        if self.objective.trim().is_empty() {
            return Err(OkrError::validation("objective must not be empty"));
        }
        if self.key_result.trim().is_empty() {
            return Err(OkrError::validation("key result must not be empty"));
        }
        validate_value("target value", self.target_value)?;
        validate_value("actual value", self.actual_value)
    }
}

/// Measured values are finite and non-negative
pub fn validate_value(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(OkrError::validation(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OkrDraft {
        OkrDraft {
            period_id: "HK1".to_string(),
            objective: " Cải thiện môn Toán ".to_string(),
            key_result: "Đạt 8 điểm kiểm tra".to_string(),
            target_value: 8.0,
            actual_value: 6.0,
            unit: "điểm".to_string(),
        }
    }

    #[test]
    fn test_from_draft_is_pending() {
        let okr = Okr::from_draft("okr-1", "hs@school.vn", draft());

        assert_eq!(okr.status, OkrStatus::Pending);
        assert_eq!(okr.objective, "Cải thiện môn Toán");
        assert!(!okr.delete_requested);
        assert_eq!(okr.percent(), 75.0);
        assert_eq!(okr.rank(), Rank::Fair);
    }

    #[test]
    fn test_apply_draft_resets_status() {
        let mut okr = Okr::from_draft("okr-1", "hs@school.vn", draft());
        okr.status = OkrStatus::Approved;

        let mut edited = draft();
        edited.target_value = 10.0;
        okr.apply_draft(edited);

        assert_eq!(okr.status, OkrStatus::Pending);
        assert_eq!(okr.target_value, 10.0);
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut empty = draft();
        empty.objective = "   ".to_string();
        assert!(empty.validate().is_err());

        let mut negative = draft();
        negative.target_value = -1.0;
        assert!(negative.validate().is_err());

        let mut nan = draft();
        nan.actual_value = f64::NAN;
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_zero_target_is_allowed() {
        let mut zero = draft();
        zero.target_value = 0.0;
        assert!(zero.validate().is_ok());

        let okr = Okr::from_draft("okr-2", "hs@school.vn", zero);
        assert_eq!(okr.percent(), 0.0);
        assert_eq!(okr.rank(), Rank::NotPassed);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Approved".parse::<OkrStatus>().unwrap(), OkrStatus::Approved);
        assert!("done".parse::<OkrStatus>().is_err());
    }
}
