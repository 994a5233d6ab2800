//! Screen-recording session models.
//!
//! A session starts out `Recording` and accepts frames until it is
//! completed. Completion computes the `SessionSummary` once and freezes it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Recording,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Recording => "recording",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "recording" => Some(SessionStatus::Recording),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

/// Aggregate over a session's frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_frames: u32,
    pub duration_seconds: i64,
    /// 0-10.
    pub wellness_score: f64,
    /// 0-10.
    pub productivity_score: f64,
    pub sentiment_distribution: BTreeMap<String, u32>,
    pub app_usage: BTreeMap<String, u32>,
    pub content_categories: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSession {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub status: SessionStatus,
    /// Present once the session is completed.
    pub summary: Option<SessionSummary>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScreenSession {
    pub fn is_recording(&self) -> bool {
        self.status == SessionStatus::Recording
    }

    pub fn wellness_score(&self) -> Option<f64> {
        self.summary.as_ref().map(|s| s.wellness_score)
    }

    pub fn productivity_score(&self) -> Option<f64> {
        self.summary.as_ref().map(|s| s.productivity_score)
    }

    pub fn duration_seconds(&self) -> i64 {
        self.summary.as_ref().map(|s| s.duration_seconds).unwrap_or(0)
    }

    pub fn total_frames(&self) -> u32 {
        self.summary.as_ref().map(|s| s.total_frames).unwrap_or(0)
    }
}
