use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::assessment::CheckIn;
use crate::db::{
    connection::Database,
    helpers::{from_json, parse_datetime, to_json},
    models::{AssessmentKind, PeriodicAssessment},
};

const ASSESSMENT_COLUMNS: &str = "id, user_id, assessment_type, period_key, scores_json, \
     big_five_json, responses_json, insights_json, improvement_score, created_at, completed_at";

fn row_to_assessment(row: &Row) -> Result<PeriodicAssessment> {
    let kind: String = row.get("assessment_type")?;
    let scores: String = row.get("scores_json")?;
    let big_five: Option<String> = row.get("big_five_json")?;
    let responses: String = row.get("responses_json")?;
    let insights: String = row.get("insights_json")?;
    let created_at: String = row.get("created_at")?;
    let completed_at: String = row.get("completed_at")?;

    Ok(PeriodicAssessment {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        kind: AssessmentKind::parse(&kind)
            .ok_or_else(|| anyhow!("unknown assessment type {kind}"))?,
        period_key: row.get("period_key")?,
        scores: from_json(&scores, "scores_json")?,
        big_five_snapshot: big_five
            .map(|raw| from_json(&raw, "big_five_json"))
            .transpose()?,
        responses: from_json(&responses, "responses_json")?,
        insights: from_json(&insights, "insights_json")?,
        improvement_score: row.get("improvement_score")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        completed_at: parse_datetime(&completed_at, "completed_at")?,
    })
}

fn assessment_for_period(
    conn: &Connection,
    user_id: i64,
    kind: AssessmentKind,
    period_key: &str,
) -> Result<Option<PeriodicAssessment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ASSESSMENT_COLUMNS} FROM periodic_assessments
         WHERE user_id = ?1 AND assessment_type = ?2 AND period_key = ?3"
    ))?;
    let mut rows = stmt.query(params![user_id, kind.as_str(), period_key])?;
    rows.next()?.map(row_to_assessment).transpose()
}

impl Database {
    /// Insert the check-in, or overwrite the one already stored for the same
    /// `(user, kind, period)`. The original `created_at` is kept.
    pub async fn upsert_assessment(&self, user_id: i64, check_in: CheckIn) -> Result<PeriodicAssessment> {
        self.execute(move |conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO periodic_assessments (
                     user_id, assessment_type, period_key, overall_wellness, scores_json,
                     big_five_json, responses_json, insights_json, improvement_score,
                     created_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
                 ON CONFLICT(user_id, assessment_type, period_key) DO UPDATE SET
                     overall_wellness = excluded.overall_wellness,
                     scores_json = excluded.scores_json,
                     big_five_json = excluded.big_five_json,
                     responses_json = excluded.responses_json,
                     insights_json = excluded.insights_json,
                     improvement_score = excluded.improvement_score,
                     completed_at = excluded.completed_at",
                params![
                    user_id,
                    check_in.kind.as_str(),
                    check_in.period_key,
                    check_in.scores.overall_wellness,
                    to_json(&check_in.scores, "scores_json")?,
                    check_in
                        .big_five_snapshot
                        .as_ref()
                        .map(|snapshot| to_json(snapshot, "big_five_json"))
                        .transpose()?,
                    to_json(&check_in.responses, "responses_json")?,
                    to_json(&check_in.insights, "insights_json")?,
                    check_in.improvement_score,
                    now,
                ],
            )?;

            assessment_for_period(conn, user_id, check_in.kind, &check_in.period_key)?
                .ok_or_else(|| anyhow!("Assessment not found after upsert"))
        })
        .await
    }

    pub async fn get_assessment(
        &self,
        user_id: i64,
        kind: AssessmentKind,
        period_key: &str,
    ) -> Result<Option<PeriodicAssessment>> {
        let period_key = period_key.to_string();
        self.execute(move |conn| assessment_for_period(conn, user_id, kind, &period_key))
            .await
    }

    /// Newest period first.
    pub async fn latest_assessments(
        &self,
        user_id: i64,
        kind: AssessmentKind,
        limit: usize,
    ) -> Result<Vec<PeriodicAssessment>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ASSESSMENT_COLUMNS} FROM periodic_assessments
                 WHERE user_id = ?1 AND assessment_type = ?2
                 ORDER BY period_key DESC
                 LIMIT ?3"
            ))?;
            let mut rows = stmt.query(params![user_id, kind.as_str(), limit])?;
            let mut assessments = Vec::new();
            while let Some(row) = rows.next()? {
                assessments.push(row_to_assessment(row)?);
            }
            Ok(assessments)
        })
        .await
    }

    pub async fn has_assessment(
        &self,
        user_id: i64,
        kind: AssessmentKind,
        period_key: &str,
    ) -> Result<bool> {
        let period_key = period_key.to_string();
        self.execute(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT id FROM periodic_assessments
                     WHERE user_id = ?1 AND assessment_type = ?2 AND period_key = ?3",
                    params![user_id, kind.as_str(), period_key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }
}
