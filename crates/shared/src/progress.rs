//! Progress math: percent complete and rank buckets

use serde::{Deserialize, Serialize};
use std::fmt;

/// `actual / target * 100`, or 0 when the target is 0.
///
/// Over-achievement is kept (150% stays 150%).
pub fn percent_complete(actual: f64, target: f64) -> f64 {
    if target == 0.0 || !target.is_finite() || !actual.is_finite() {
        return 0.0;
    }
    actual / target * 100.0
}

/// Four-level grading used on school reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rank {
    /// >= 80%
    Good,
    /// >= 65%
    Fair,
    /// >= 50%
    Pass,
    NotPassed,
}

impl Rank {
    pub const GOOD_THRESHOLD: f64 = 80.0;
    pub const FAIR_THRESHOLD: f64 = 65.0;
    pub const PASS_THRESHOLD: f64 = 50.0;

    pub fn from_percent(percent: f64) -> Self {
        if percent >= Self::GOOD_THRESHOLD {
            Rank::Good
        } else if percent >= Self::FAIR_THRESHOLD {
            Rank::Fair
        } else if percent >= Self::PASS_THRESHOLD {
            Rank::Pass
        } else {
            Rank::NotPassed
        }
    }

    /// Vietnamese label as printed on report cards
    pub fn label(&self) -> &'static str {
        match self {
            Rank::Good => "Tốt",
            Rank::Fair => "Khá",
            Rank::Pass => "Đạt",
            Rank::NotPassed => "Chưa đạt",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A student's standing in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub student_email: String,
    pub student_name: String,
    pub period_id: String,
    pub okr_count: usize,
    /// Mean percent over the student's OKRs (0 with none)
    pub percent: f64,
    pub rank: Rank,
}

impl StudentProgress {
    /// Aggregate per-OKR percents into one standing
    pub fn from_percents(
        student_email: impl Into<String>,
        student_name: impl Into<String>,
        period_id: impl Into<String>,
        percents: &[f64],
    ) -> Self {
        let percent = if percents.is_empty() {
            0.0
        } else {
            percents.iter().sum::<f64>() / percents.len() as f64
        };

        Self {
            student_email: student_email.into(),
            student_name: student_name.into(),
            period_id: period_id.into(),
            okr_count: percents.len(),
            percent,
            rank: Rank::from_percent(percent),
        }
    }
}

/// Number of students per rank
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankDistribution {
    pub good: usize,
    pub fair: usize,
    pub pass: usize,
    pub not_passed: usize,
}

impl RankDistribution {
    pub fn record(&mut self, rank: Rank) {
        match rank {
            Rank::Good => self.good += 1,
            Rank::Fair => self.fair += 1,
            Rank::Pass => self.pass += 1,
            Rank::NotPassed => self.not_passed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.good + self.fair + self.pass + self.not_passed
    }
}

/// Standing of every student of a class in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub class_name: String,
    pub period_id: String,
    /// Sorted by percent, best first
    pub students: Vec<StudentProgress>,
    pub distribution: RankDistribution,
}

impl ClassSummary {
    pub fn new(
        class_name: impl Into<String>,
        period_id: impl Into<String>,
        mut students: Vec<StudentProgress>,
    ) -> Self {
        students.sort_by(|a, b| {
            b.percent
                .total_cmp(&a.percent)
                .then_with(|| a.student_email.cmp(&b.student_email))
        });

        let mut distribution = RankDistribution::default();
        for student in &students {
            distribution.record(student.rank);
        }

        Self {
            class_name: class_name.into(),
            period_id: period_id.into(),
            students,
            distribution,
        }
    }
}
