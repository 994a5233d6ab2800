use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, to_u32},
    models::{NewUser, User},
};

const USER_COLUMNS: &str =
    "id, email, name, age, gender, occupation, location, quiz_completed, created_at";

pub(crate) fn row_to_user(row: &Row) -> Result<User> {
    let created_at: String = row.get("created_at")?;
    let age: Option<i64> = row.get("age")?;

    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        age: age.map(|a| to_u32(a, "age")).transpose()?,
        gender: row.get("gender")?,
        occupation: row.get("occupation")?,
        location: row.get("location")?,
        quiz_completed: row.get("quiz_completed")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Register a user. Emails are unique, compared case-insensitively.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.execute(move |conn| {
            let email = new_user.email.trim().to_lowercase();
            if email.is_empty() {
                bail!("email must not be empty");
            }
            if new_user.name.trim().is_empty() {
                bail!("name must not be empty");
            }

            let exists: Option<i64> = conn
                .query_row("SELECT id FROM users WHERE email = ?1", params![email], |row| {
                    row.get(0)
                })
                .optional()?;
            if exists.is_some() {
                bail!("a user with email {email} already exists");
            }

            conn.execute(
                "INSERT INTO users (email, name, age, gender, occupation, location, quiz_completed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
                params![
                    email,
                    new_user.name.trim(),
                    new_user.age,
                    new_user.gender,
                    new_user.occupation,
                    new_user.location,
                    Utc::now().to_rfc3339(),
                ],
            )?;

            let user_id = conn.last_insert_rowid();
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            let mut rows = stmt.query(params![user_id])?;
            match rows.next()? {
                Some(row) => row_to_user(row),
                None => Err(anyhow!("User not found after insert")),
            }
        })
        .await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            let mut rows = stmt.query(params![user_id])?;
            rows.next()?.map(row_to_user).transpose()
        })
        .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        self.execute(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"))?;
            let mut rows = stmt.query(params![email])?;
            rows.next()?.map(row_to_user).transpose()
        })
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))?;
            let mut rows = stmt.query([])?;
            let mut users = Vec::new();
            while let Some(row) = rows.next()? {
                users.push(row_to_user(row)?);
            }
            Ok(users)
        })
        .await
    }
}
