use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{from_json, parse_datetime, to_json, to_u32},
    models::{
        AnalysisSource, ContentCategory, FrameRecord, Sentiment, SessionStatus, WellnessImpact,
    },
};

const FRAME_COLUMNS: &str = "id, session_id, frame_number, timestamp, frame_path, app_detected, \
     content_type, extracted_text, detected_language, translated_text, content_description, \
     objects_detected, engagement, concerns, sentiment, sentiment_score, wellness_impact, source, \
     phash, created_at";

pub(crate) const FRAME_IMPACT_SQL: &str = "SELECT wellness_impact
     FROM frame_analyses
     WHERE session_id IN (
         SELECT id FROM screen_sessions
         WHERE user_id = ?1 AND status = 'completed'
         ORDER BY created_at DESC, id DESC
         LIMIT ?2
     )
     ORDER BY session_id DESC, frame_number ASC";

/// Outcome of storing one analysed frame.
#[derive(Debug, Clone)]
pub enum FrameInsert {
    Inserted(Box<FrameRecord>),
    UnknownSession,
    /// The session is no longer recording.
    SessionClosed,
    /// The session already holds the maximum number of frames.
    CapReached,
}

fn row_to_frame(row: &Row) -> Result<FrameRecord> {
    let frame_number: i64 = row.get("frame_number")?;
    let content_type: String = row.get("content_type")?;
    let objects: String = row.get("objects_detected")?;
    let engagement: String = row.get("engagement")?;
    let concerns: String = row.get("concerns")?;
    let sentiment: String = row.get("sentiment")?;
    let impact: String = row.get("wellness_impact")?;
    let source: String = row.get("source")?;
    let created_at: String = row.get("created_at")?;

    Ok(FrameRecord {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        frame_number: to_u32(frame_number, "frame_number")?,
        timestamp: row.get("timestamp")?,
        frame_path: row.get("frame_path")?,
        app_detected: row.get("app_detected")?,
        content_type: ContentCategory::parse(&content_type),
        extracted_text: row.get("extracted_text")?,
        detected_language: row.get("detected_language")?,
        translated_text: row.get("translated_text")?,
        content_description: row.get("content_description")?,
        objects_detected: from_json(&objects, "objects_detected")?,
        engagement: from_json(&engagement, "engagement")?,
        concerns: from_json(&concerns, "concerns")?,
        sentiment: Sentiment::parse(&sentiment),
        sentiment_score: row.get("sentiment_score")?,
        wellness_impact: WellnessImpact::parse(&impact),
        source: AnalysisSource::parse(&source),
        phash: row.get("phash")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

/// Frames of one session in frame order.
pub(crate) fn frames_in_session(conn: &Connection, session_id: i64) -> Result<Vec<FrameRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FRAME_COLUMNS} FROM frame_analyses
         WHERE session_id = ?1
         ORDER BY frame_number ASC, id ASC"
    ))?;
    let mut rows = stmt.query(params![session_id])?;
    let mut frames = Vec::new();
    while let Some(row) = rows.next()? {
        frames.push(row_to_frame(row)?);
    }
    Ok(frames)
}

impl Database {
    /// Persist an analysed frame. The status check, the cap check and the
    /// insert run as one task on the DB thread, so a frame can never land in
    /// a completed session.
    pub async fn insert_frame(&self, frame: FrameRecord, max_frames: u32) -> Result<FrameInsert> {
        self.transaction(move |tx| {
            let status: Option<String> = tx
                .query_row(
                    "SELECT status FROM screen_sessions WHERE id = ?1",
                    params![frame.session_id],
                    |row| row.get(0),
                )
                .optional()?;
            match status.as_deref().and_then(SessionStatus::parse) {
                None => return Ok(FrameInsert::UnknownSession),
                Some(SessionStatus::Completed) => return Ok(FrameInsert::SessionClosed),
                Some(SessionStatus::Recording) => {}
            }

            let count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM frame_analyses WHERE session_id = ?1",
                params![frame.session_id],
                |row| row.get(0),
            )?;
            if count >= i64::from(max_frames) {
                return Ok(FrameInsert::CapReached);
            }

            tx.execute(
                "INSERT INTO frame_analyses (
                     session_id, frame_number, timestamp, frame_path, app_detected, content_type,
                     extracted_text, detected_language, translated_text, content_description,
                     objects_detected, engagement, concerns, sentiment, sentiment_score,
                     wellness_impact, source, phash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                params![
                    frame.session_id,
                    frame.frame_number,
                    frame.timestamp,
                    frame.frame_path,
                    frame.app_detected,
                    frame.content_type.as_str(),
                    frame.extracted_text,
                    frame.detected_language,
                    frame.translated_text,
                    frame.content_description,
                    to_json(&frame.objects_detected, "objects_detected")?,
                    to_json(&frame.engagement, "engagement")?,
                    to_json(&frame.concerns, "concerns")?,
                    frame.sentiment.as_str(),
                    frame.sentiment_score,
                    frame.wellness_impact.as_str(),
                    frame.source.as_str(),
                    frame.phash,
                    frame.created_at.to_rfc3339(),
                ],
            )?;
            let id = tx.last_insert_rowid();

            let mut stored = frame;
            stored.id = Some(id);
            Ok(FrameInsert::Inserted(Box::new(stored)))
        })
        .await
    }

    pub async fn session_frames(&self, session_id: i64) -> Result<Vec<FrameRecord>> {
        self.execute(move |conn| frames_in_session(conn, session_id))
            .await
    }

    pub async fn frame_count(&self, session_id: i64) -> Result<u32> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM frame_analyses WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            to_u32(count, "frame count")
        })
        .await
    }

    /// Every frame a user's completed sessions recorded for one app, matched
    /// case-insensitively.
    pub async fn app_frames(&self, user_id: i64, app_name: &str) -> Result<Vec<FrameRecord>> {
        let app_name = app_name.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FRAME_COLUMNS} FROM frame_analyses
                 WHERE session_id IN (
                     SELECT id FROM screen_sessions WHERE user_id = ?1 AND status = 'completed'
                 )
                   AND app_detected = ?2 COLLATE NOCASE
                 ORDER BY session_id ASC, frame_number ASC"
            ))?;
            let mut rows = stmt.query(params![user_id, app_name])?;
            let mut frames = Vec::new();
            while let Some(row) = rows.next()? {
                frames.push(row_to_frame(row)?);
            }
            Ok(frames)
        })
        .await
    }
}
