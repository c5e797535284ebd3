//! Database operations for the `users_invalid` failure log.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use storyscan_core::FailureCategory;

use crate::DbError;

/// A row from the `users_invalid` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FailureRow {
    pub id: i64,
    pub run_id: i64,
    pub username: String,
    pub category: String,
    pub error_message: String,
    pub captured_at: DateTime<Utc>,
}

impl FailureRow {
    /// Parses the stored category.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownCategory`] if the column holds an unrecognized value.
    pub fn category(&self) -> Result<FailureCategory, DbError> {
        FailureCategory::parse(&self.category)
            .ok_or_else(|| DbError::UnknownCategory(self.category.clone()))
    }
}

/// Appends one failed attempt for `identifier`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn append_failure(
    pool: &SqlitePool,
    run_id: i64,
    identifier: &str,
    category: FailureCategory,
    reason: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO users_invalid (run_id, username, category, error_message, captured_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(run_id)
    .bind(identifier)
    .bind(category.as_str())
    .bind(reason)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns the distinct identifiers of `run_id`'s failure log that have no
/// success row in the same run.
///
/// Category is ignored: invalid, error, and fetch failures are all returned.
/// An identifier that succeeded in this run is never fetched again within it,
/// so this is the run's outstanding failure set.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_failed_identifiers(
    pool: &SqlitePool,
    run_id: i64,
) -> Result<BTreeSet<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT f.username \
         FROM users_invalid f \
         WHERE f.run_id = ?1 \
           AND NOT EXISTS ( \
               SELECT 1 FROM users u WHERE u.run_id = f.run_id AND u.username = f.username \
           )",
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Returns the full failure log across all runs, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_failures(pool: &SqlitePool) -> Result<Vec<FailureRow>, DbError> {
    let rows = sqlx::query_as::<_, FailureRow>(
        "SELECT id, run_id, username, category, error_message, captured_at \
         FROM users_invalid \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
