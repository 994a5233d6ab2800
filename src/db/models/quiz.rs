//! Quiz answers and the profile derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::personality::{QuizResults, StressLevel};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: i64,
    pub user_id: i64,
    pub question_id: String,
    pub answer: u8,
    pub created_at: DateTime<Utc>,
}

/// Latest quiz outcome for a user. Replaced on every submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityProfile {
    pub user_id: i64,
    pub results: QuizResults,
    pub assessed_at: DateTime<Utc>,
}

/// One point of the user's quiz history. Survives retakes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WellnessHistoryEntry {
    pub date: DateTime<Utc>,
    pub mental_wellness_index: f64,
    pub digital_wellness_index: f64,
    pub stress_level: StressLevel,
}
