use std::fmt;

use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::frames::{frames_in_session, FRAME_IMPACT_SQL};
use crate::aggregation;
use crate::db::{
    connection::Database,
    helpers::{from_json, parse_datetime, parse_optional_datetime, to_json, to_u32},
    models::{ScreenSession, SessionStatus, SessionSummary, WellnessImpact},
};

const SESSION_COLUMNS: &str = "id, user_id, name, status, total_frames, duration_seconds, \
     wellness_score, productivity_score, sentiment_distribution, app_usage, content_categories, \
     created_at, completed_at";

/// Why a session could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionError {
    NotFound(i64),
    AlreadyCompleted(i64),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::NotFound(id) => write!(f, "session {id} not found"),
            CompletionError::AlreadyCompleted(id) => write!(f, "session {id} is already completed"),
        }
    }
}

impl std::error::Error for CompletionError {}

pub(crate) fn row_to_session(row: &Row) -> Result<ScreenSession> {
    let status: String = row.get("status")?;
    let status = SessionStatus::parse(&status)
        .ok_or_else(|| anyhow!("unknown session status {status}"))?;
    let created_at: String = row.get("created_at")?;
    let completed_at: Option<String> = row.get("completed_at")?;

    let summary = if status == SessionStatus::Completed {
        let total_frames: i64 = row.get("total_frames")?;
        let sentiments: String = row.get("sentiment_distribution")?;
        let apps: String = row.get("app_usage")?;
        let categories: String = row.get("content_categories")?;
        Some(SessionSummary {
            total_frames: to_u32(total_frames, "total_frames")?,
            duration_seconds: row.get("duration_seconds")?,
            wellness_score: row.get("wellness_score")?,
            productivity_score: row.get("productivity_score")?,
            sentiment_distribution: from_json(&sentiments, "sentiment_distribution")?,
            app_usage: from_json(&apps, "app_usage")?,
            content_categories: from_json(&categories, "content_categories")?,
        })
    } else {
        None
    };

    Ok(ScreenSession {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        status,
        summary,
        created_at: parse_datetime(&created_at, "created_at")?,
        completed_at: parse_optional_datetime(completed_at, "completed_at")?,
    })
}

fn collect_sessions(mut rows: rusqlite::Rows<'_>) -> Result<Vec<ScreenSession>> {
    let mut sessions = Vec::new();
    while let Some(row) = rows.next()? {
        sessions.push(row_to_session(row)?);
    }
    Ok(sessions)
}

impl Database {
    pub async fn create_session(&self, user_id: i64, name: Option<String>) -> Result<ScreenSession> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO screen_sessions (user_id, name, status, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    user_id,
                    name,
                    SessionStatus::Recording.as_str(),
                    Utc::now().to_rfc3339(),
                ],
            )?;
            let session_id = conn.last_insert_rowid();

            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM screen_sessions WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![session_id])?;
            match rows.next()? {
                Some(row) => row_to_session(row),
                None => Err(anyhow!("Session not found after insert")),
            }
        })
        .await
    }

    pub async fn get_session(&self, session_id: i64) -> Result<Option<ScreenSession>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM screen_sessions WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![session_id])?;
            rows.next()?.map(row_to_session).transpose()
        })
        .await
    }

    /// Fold every persisted frame into the summary and close the session,
    /// all inside one transaction. Only a `recording` session can be
    /// completed, so concurrent calls produce exactly one summary; the others
    /// fail with [`CompletionError::AlreadyCompleted`].
    pub async fn complete_session(&self, session_id: i64) -> Result<ScreenSession> {
        self.transaction(move |tx| {
            let status: Option<String> = tx
                .query_row(
                    "SELECT status FROM screen_sessions WHERE id = ?1",
                    params![session_id],
                    |row| row.get(0),
                )
                .optional()?;
            match status.as_deref().and_then(SessionStatus::parse) {
                None => return Err(CompletionError::NotFound(session_id).into()),
                Some(SessionStatus::Completed) => {
                    return Err(CompletionError::AlreadyCompleted(session_id).into())
                }
                Some(SessionStatus::Recording) => {}
            }

            let frames = frames_in_session(tx, session_id)?;
            let summary = aggregation::summarize(&frames);

            let updated = tx.execute(
                "UPDATE screen_sessions
                 SET status = ?1,
                     total_frames = ?2,
                     duration_seconds = ?3,
                     wellness_score = ?4,
                     productivity_score = ?5,
                     sentiment_distribution = ?6,
                     app_usage = ?7,
                     content_categories = ?8,
                     completed_at = ?9
                 WHERE id = ?10 AND status = 'recording'",
                params![
                    SessionStatus::Completed.as_str(),
                    summary.total_frames,
                    summary.duration_seconds,
                    summary.wellness_score,
                    summary.productivity_score,
                    to_json(&summary.sentiment_distribution, "sentiment_distribution")?,
                    to_json(&summary.app_usage, "app_usage")?,
                    to_json(&summary.content_categories, "content_categories")?,
                    Utc::now().to_rfc3339(),
                    session_id,
                ],
            )?;
            if updated != 1 {
                return Err(CompletionError::AlreadyCompleted(session_id).into());
            }

            let session = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {SESSION_COLUMNS} FROM screen_sessions WHERE id = ?1"
                ))?;
                let mut rows = stmt.query(params![session_id])?;
                match rows.next()? {
                    Some(row) => row_to_session(row)?,
                    None => return Err(CompletionError::NotFound(session_id).into()),
                }
            };
            Ok(session)
        })
        .await
    }

    /// Completed sessions of a user, newest first.
    pub async fn completed_sessions(&self, user_id: i64) -> Result<Vec<ScreenSession>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM screen_sessions
                 WHERE user_id = ?1 AND status = 'completed'
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query(params![user_id])?;
            collect_sessions(rows)
        })
        .await
    }

    /// Every session still accepting frames, oldest first.
    pub async fn recording_sessions(&self) -> Result<Vec<ScreenSession>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM screen_sessions
                 WHERE status = 'recording'
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query([])?;
            collect_sessions(rows)
        })
        .await
    }

    /// Wellness impacts of every frame in the user's newest `session_limit`
    /// completed sessions.
    pub async fn recent_frame_impacts(
        &self,
        user_id: i64,
        session_limit: usize,
    ) -> Result<Vec<WellnessImpact>> {
        let limit = i64::try_from(session_limit).unwrap_or(i64::MAX);
        self.execute(move |conn| {
            let mut stmt = conn.prepare(FRAME_IMPACT_SQL)?;
            let mut rows = stmt.query(params![user_id, limit])?;
            let mut impacts = Vec::new();
            while let Some(row) = rows.next()? {
                let impact: String = row.get(0)?;
                impacts.push(WellnessImpact::parse(&impact));
            }
            Ok(impacts)
        })
        .await
    }
}
