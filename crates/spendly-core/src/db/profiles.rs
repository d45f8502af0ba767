//! Profile operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{parse_amount, parse_datetime, Database};
use crate::error::Result;
use crate::models::Profile;
use crate::validate::ProfileUpdate;

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<(Profile, String)> {
    let salary: String = row.get(3)?;
    let dob: Option<String> = row.get(5)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;
    Ok((
        Profile {
            id: row.get(0)?,
            user_id: row.get(1)?,
            full_name: row.get(2)?,
            monthly_salary: Decimal::ZERO, // filled in by the caller from `salary`
            phone_number: row.get(4)?,
            date_of_birth: dob.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            address: row.get(6)?,
            profile_picture_path: row.get(7)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        },
        salary,
    ))
}

const PROFILE_COLUMNS: &str = "id, user_id, full_name, monthly_salary, phone_number, \
     date_of_birth, address, profile_picture_path, created_at, updated_at";

impl Database {
    /// Fetch a user's profile, creating an empty one if it does not exist yet.
    pub fn get_or_create_profile(&self, user_id: i64) -> Result<Profile> {
        let conn = self.conn()?;

        let existing = conn
            .query_row(
                &format!("SELECT {} FROM profiles WHERE user_id = ?1", PROFILE_COLUMNS),
                params![user_id],
                row_to_profile,
            )
            .optional()?;

        let (mut profile, salary) = match existing {
            Some(found) => found,
            None => {
                conn.execute(
                    "INSERT INTO profiles (user_id) VALUES (?1)",
                    params![user_id],
                )?;
                conn.query_row(
                    &format!("SELECT {} FROM profiles WHERE user_id = ?1", PROFILE_COLUMNS),
                    params![user_id],
                    row_to_profile,
                )?
            }
        };

        profile.monthly_salary = parse_amount(&salary)?;
        Ok(profile)
    }

    /// The user's monthly salary, or zero when no profile or salary exists.
    /// A missing salary is never an error.
    pub fn monthly_salary(&self, user_id: i64) -> Result<Decimal> {
        let conn = self.conn()?;
        let salary: Option<String> = conn
            .query_row(
                "SELECT monthly_salary FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        match salary {
            Some(s) => parse_amount(&s),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Apply a partial profile update. Fields left `None` are unchanged.
    pub fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<Profile> {
        update.validate()?;

        // Ensure the row exists before updating
        let current = self.get_or_create_profile(user_id)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            UPDATE profiles
            SET full_name = ?2,
                monthly_salary = ?3,
                phone_number = ?4,
                date_of_birth = ?5,
                address = ?6,
                profile_picture_path = ?7,
                updated_at = CURRENT_TIMESTAMP
            WHERE user_id = ?1
            "#,
            params![
                user_id,
                update.full_name.as_ref().unwrap_or(&current.full_name),
                update
                    .monthly_salary
                    .unwrap_or(current.monthly_salary)
                    .to_string(),
                update
                    .phone_number
                    .as_ref()
                    .unwrap_or(&current.phone_number),
                update
                    .date_of_birth
                    .or(current.date_of_birth)
                    .map(|d| d.to_string()),
                update.address.as_ref().unwrap_or(&current.address),
                update
                    .profile_picture_path
                    .clone()
                    .or(current.profile_picture_path),
            ],
        )?;

        self.get_or_create_profile(user_id)
    }
}
