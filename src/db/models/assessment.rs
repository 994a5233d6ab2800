//! Weekly and monthly check-in records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::personality::Trait;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Weekly,
    Monthly,
}

impl AssessmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentKind::Weekly => "weekly",
            AssessmentKind::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "weekly" => Some(AssessmentKind::Weekly),
            "monthly" => Some(AssessmentKind::Monthly),
            _ => None,
        }
    }
}

/// Scores are on a 0-100 scale. Sub-scores not asked by a cadence stay
/// `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentScores {
    pub overall_wellness: f64,
    pub mental_wellness_score: Option<f64>,
    pub stress_level_score: Option<f64>,
    pub energy_score: Option<f64>,
    pub sleep_quality_score: Option<f64>,
    pub digital_wellness_score: Option<f64>,
    pub productivity_score: Option<f64>,
    pub mood_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodicAssessment {
    pub id: i64,
    pub user_id: i64,
    pub kind: AssessmentKind,
    /// `YYYY-Www` or `YYYY-MM`.
    pub period_key: String,
    pub scores: AssessmentScores,
    pub big_five_snapshot: Option<BTreeMap<Trait, f64>>,
    pub responses: BTreeMap<String, u8>,
    pub insights: Vec<String>,
    /// Overall change against the previous period of the same kind.
    pub improvement_score: f64,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
