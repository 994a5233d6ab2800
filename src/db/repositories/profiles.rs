use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{from_json, parse_datetime, to_json},
    models::{PersonalityProfile, QuizResponse, WellnessHistoryEntry},
};
use crate::personality::{Answers, QuizResults, StressLevel};

fn row_to_response(row: &Row) -> Result<QuizResponse> {
    let created_at: String = row.get("created_at")?;
    Ok(QuizResponse {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        question_id: row.get("question_id")?,
        answer: row.get("answer")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn row_to_history(row: &Row) -> Result<WellnessHistoryEntry> {
    let recorded_at: String = row.get("recorded_at")?;
    let stress: String = row.get("stress_level")?;
    Ok(WellnessHistoryEntry {
        date: parse_datetime(&recorded_at, "recorded_at")?,
        mental_wellness_index: row.get("mental_wellness_index")?,
        digital_wellness_index: row.get("digital_wellness_index")?,
        stress_level: StressLevel::parse(&stress)
            .ok_or_else(|| anyhow!("unknown stress level {stress}"))?,
    })
}

impl Database {
    /// Store a quiz submission atomically: the raw answers replace any
    /// earlier ones, the profile is replaced, and one history point is
    /// appended.
    pub async fn save_quiz_submission(
        &self,
        user_id: i64,
        answers: Answers,
        results: QuizResults,
        assessed_at: DateTime<Utc>,
    ) -> Result<PersonalityProfile> {
        self.transaction(move |tx| {
            let known: Option<i64> = tx
                .query_row("SELECT id FROM users WHERE id = ?1", params![user_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if known.is_none() {
                bail!("user {user_id} not found");
            }

            let now = assessed_at.to_rfc3339();
            tx.execute("DELETE FROM quiz_responses WHERE user_id = ?1", params![user_id])?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO quiz_responses (user_id, question_id, answer, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for (question_id, answer) in &answers {
                    insert.execute(params![user_id, question_id, answer, now])?;
                }
            }

            tx.execute(
                "INSERT INTO personality_profiles (user_id, personality_type, results_json, assessed_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     personality_type = excluded.personality_type,
                     results_json = excluded.results_json,
                     assessed_at = excluded.assessed_at",
                params![
                    user_id,
                    results.personality_type,
                    to_json(&results, "results_json")?,
                    now,
                ],
            )?;

            tx.execute(
                "INSERT INTO wellness_history (user_id, recorded_at, mental_wellness_index, digital_wellness_index, stress_level)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user_id,
                    now,
                    results.mental_health.wellness_index,
                    results.digital_wellness.wellness_index,
                    results.stress_level.as_str(),
                ],
            )?;

            tx.execute(
                "UPDATE users SET quiz_completed = 1 WHERE id = ?1",
                params![user_id],
            )?;

            Ok(PersonalityProfile {
                user_id,
                results,
                assessed_at,
            })
        })
        .await
    }

    pub async fn get_profile(&self, user_id: i64) -> Result<Option<PersonalityProfile>> {
        self.execute(move |conn| {
            let row: Option<(String, String)> = conn
                .query_row(
                    "SELECT results_json, assessed_at FROM personality_profiles WHERE user_id = ?1",
                    params![user_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            row.map(|(results, assessed_at)| -> Result<PersonalityProfile> {
                Ok(PersonalityProfile {
                    user_id,
                    results: from_json(&results, "results_json")?,
                    assessed_at: parse_datetime(&assessed_at, "assessed_at")?,
                })
            })
            .transpose()
        })
        .await
    }

    pub async fn quiz_responses(&self, user_id: i64) -> Result<Vec<QuizResponse>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, question_id, answer, created_at
                 FROM quiz_responses
                 WHERE user_id = ?1
                 ORDER BY id ASC",
            )?;
            let mut rows = stmt.query(params![user_id])?;
            let mut responses = Vec::new();
            while let Some(row) = rows.next()? {
                responses.push(row_to_response(row)?);
            }
            Ok(responses)
        })
        .await
    }

    /// Clear the raw answers so the quiz can be taken again. The profile and
    /// the wellness history stay.
    pub async fn reset_quiz(&self, user_id: i64) -> Result<()> {
        self.transaction(move |tx| {
            tx.execute("DELETE FROM quiz_responses WHERE user_id = ?1", params![user_id])?;
            let updated = tx.execute(
                "UPDATE users SET quiz_completed = 0 WHERE id = ?1",
                params![user_id],
            )?;
            if updated == 0 {
                bail!("user {user_id} not found");
            }
            Ok(())
        })
        .await
    }

    /// Oldest first.
    pub async fn wellness_history(&self, user_id: i64) -> Result<Vec<WellnessHistoryEntry>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT recorded_at, mental_wellness_index, digital_wellness_index, stress_level
                 FROM wellness_history
                 WHERE user_id = ?1
                 ORDER BY recorded_at ASC, id ASC",
            )?;
            let mut rows = stmt.query(params![user_id])?;
            let mut history = Vec::new();
            while let Some(row) = rows.next()? {
                history.push(row_to_history(row)?);
            }
            Ok(history)
        })
        .await
    }
}
