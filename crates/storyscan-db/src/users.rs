//! Database operations for the `users` success log.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use storyscan_core::UserRecord;

use crate::DbError;

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub run_id: i64,
    /// The requested identifier.
    pub username: String,
    /// Username as reported by the remote profile.
    pub profile_username: String,
    pub full_name: String,
    pub is_private: bool,
    pub is_verified: bool,
    pub profile_pic_url: String,
    pub follower_count: i64,
    pub following_count: i64,
    pub mention: Option<String>,
    pub captured_at: DateTime<Utc>,
}

/// Appends every fan-out row of one successful fetch in a single transaction.
///
/// Rows are never deduplicated: repeated appends for the same identifier are
/// expected when a retry round lands on success.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails; nothing from
/// this call is persisted in that case.
pub async fn append_user_records(
    pool: &SqlitePool,
    run_id: i64,
    records: &[UserRecord],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    for record in records {
        let profile = &record.profile;
        sqlx::query(
            "INSERT INTO users \
                 (run_id, username, profile_username, full_name, is_private, is_verified, \
                  profile_pic_url, follower_count, following_count, mention, captured_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(run_id)
        .bind(&record.identifier)
        .bind(&profile.username)
        .bind(&profile.full_name)
        .bind(profile.is_private)
        .bind(profile.is_verified)
        .bind(&profile.profile_pic_url)
        .bind(profile.follower_count)
        .bind(profile.following_count)
        .bind(record.mention.as_deref())
        .bind(record.captured_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(run_id, rows = records.len(), "appended user rows");

    Ok(records.len())
}

/// Returns the full success log across all runs, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserRow>, DbError> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, run_id, username, profile_username, full_name, is_private, is_verified, \
                profile_pic_url, follower_count, following_count, mention, captured_at \
         FROM users \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
