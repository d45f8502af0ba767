//! User operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

impl Database {
    /// Look up a user by username, creating the row (and an empty profile)
    /// on first sight. Returns the user id.
    ///
    /// Identity itself is established upstream; this only anchors ownership
    /// of records, mirroring the get-or-create flow of the web layer.
    pub fn ensure_user(&self, username: &str, email: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO users (username, email) VALUES (?1, ?2)",
            params![username, email],
        )?;
        let user_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO profiles (user_id) VALUES (?1)",
            params![user_id],
        )?;

        Ok(user_id)
    }

    /// Fetch a user by id
    pub fn get_user(&self, user_id: i64) -> Result<User> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, username, email, created_at FROM users WHERE id = ?1",
            params![user_id],
            |row| {
                let created_at: String = row.get(3)?;
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    created_at: parse_datetime(&created_at),
                })
            },
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("User not found: {}", user_id)))
    }
}
