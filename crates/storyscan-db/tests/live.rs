//! Store tests against a fresh, fully-migrated in-memory `SQLite` database.

use std::collections::BTreeSet;

use chrono::Utc;
use storyscan_core::{FailureCategory, ProfileFields, UserRecord};
use storyscan_db::{
    append_failure, append_user_records, complete_scrape_run, connect_memory_pool,
    create_scrape_run, fail_scrape_run, get_scrape_run, list_failed_identifiers, list_failures,
    list_scrape_runs, list_users, record_round, run_migrations, start_scrape_run, DbError,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn test_pool() -> sqlx::SqlitePool {
    let pool = connect_memory_pool()
        .await
        .expect("in-memory pool should open");
    run_migrations(&pool).await.expect("migrations should apply");
    pool
}

async fn running_run(pool: &sqlx::SqlitePool) -> i64 {
    let run = create_scrape_run(pool, "test", 0).await.unwrap();
    start_scrape_run(pool, run.id).await.unwrap();
    run.id
}

fn make_profile(username: &str) -> ProfileFields {
    ProfileFields {
        username: username.to_string(),
        full_name: format!("{username} full"),
        is_private: false,
        is_verified: false,
        profile_pic_url: format!("https://cdn.example.com/{username}.jpg"),
        follower_count: 10,
        following_count: 5,
    }
}

fn records_for(identifier: &str, mentions: &[&str]) -> Vec<UserRecord> {
    let mentions: BTreeSet<String> = mentions.iter().map(ToString::to_string).collect();
    UserRecord::fan_out(identifier, &make_profile(identifier), &mentions, Utc::now())
}

// ---------------------------------------------------------------------------
// scrape_runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scrape_run_lifecycle_happy_path() {
    let pool = test_pool().await;

    let run = create_scrape_run(&pool, "cli", 3).await.unwrap();
    assert_eq!(run.status, "queued");
    assert_eq!(run.identifiers_total, 3);
    assert!(run.started_at.is_none());

    start_scrape_run(&pool, run.id).await.unwrap();
    record_round(&pool, run.id, 2, 1).await.unwrap();
    record_round(&pool, run.id, 1, 0).await.unwrap();
    complete_scrape_run(&pool, run.id).await.unwrap();

    let row = get_scrape_run(&pool, run.id).await.unwrap();
    assert_eq!(row.status, "succeeded");
    assert_eq!(row.rounds_executed, 2);
    assert_eq!(row.success_count, 3);
    assert_eq!(row.fail_count, 1);
    assert!(row.started_at.is_some());
    assert!(row.completed_at.is_some());
}

#[tokio::test]
async fn start_scrape_run_twice_is_rejected() {
    let pool = test_pool().await;
    let id = running_run(&pool).await;

    let err = start_scrape_run(&pool, id).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidRunTransition {
            expected_status: "queued",
            ..
        }
    ));
}

#[tokio::test]
async fn record_round_requires_running_status() {
    let pool = test_pool().await;
    let run = create_scrape_run(&pool, "cli", 0).await.unwrap();

    let err = record_round(&pool, run.id, 1, 0).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidRunTransition { .. }));
}

#[tokio::test]
async fn fail_scrape_run_stores_message() {
    let pool = test_pool().await;
    let id = running_run(&pool).await;

    fail_scrape_run(&pool, id, "disk full").await.unwrap();

    let row = get_scrape_run(&pool, id).await.unwrap();
    assert_eq!(row.status, "failed");
    assert_eq!(row.error_message.as_deref(), Some("disk full"));
    assert!(fail_scrape_run(&pool, id, "again").await.is_err());
}

#[tokio::test]
async fn get_scrape_run_missing_returns_not_found() {
    let pool = test_pool().await;
    let err = get_scrape_run(&pool, 9999).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[tokio::test]
async fn list_scrape_runs_returns_newest_first() {
    let pool = test_pool().await;
    let first = create_scrape_run(&pool, "cli", 0).await.unwrap();
    let second = create_scrape_run(&pool, "cli", 0).await.unwrap();

    let runs = list_scrape_runs(&pool, 10).await.unwrap();
    let ids: Vec<i64> = runs.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn append_user_records_writes_one_row_per_mention() {
    let pool = test_pool().await;
    let run_id = running_run(&pool).await;

    let written = append_user_records(&pool, run_id, &records_for("alice", &["a", "b", "a"]))
        .await
        .unwrap();
    assert_eq!(written, 2);

    let rows = list_users(&pool).await.unwrap();
    assert_eq!(rows.len(), 2);
    let mentions: Vec<_> = rows.iter().filter_map(|r| r.mention.as_deref()).collect();
    assert_eq!(mentions, vec!["a", "b"]);
    assert!(rows.iter().all(|r| r.username == "alice"));
    assert!(rows.iter().all(|r| r.follower_count == 10));
}

#[tokio::test]
async fn append_user_records_without_mentions_writes_null_row() {
    let pool = test_pool().await;
    let run_id = running_run(&pool).await;

    append_user_records(&pool, run_id, &records_for("alice", &[]))
        .await
        .unwrap();

    let rows = list_users(&pool).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].mention.is_none());
    assert_eq!(rows[0].profile_username, "alice");
}

#[tokio::test]
async fn repeated_appends_are_kept() {
    let pool = test_pool().await;
    let run_id = running_run(&pool).await;

    append_user_records(&pool, run_id, &records_for("alice", &[]))
        .await
        .unwrap();
    append_user_records(&pool, run_id, &records_for("alice", &[]))
        .await
        .unwrap();

    assert_eq!(list_users(&pool).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// users_invalid
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failure_log_keeps_every_attempt() {
    let pool = test_pool().await;
    let run_id = running_run(&pool).await;

    append_failure(&pool, run_id, "bob", FailureCategory::Fetch, "timeout")
        .await
        .unwrap();
    append_failure(&pool, run_id, "bob", FailureCategory::Error, "profile section missing")
        .await
        .unwrap();

    let rows = list_failures(&pool).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].category().unwrap(), FailureCategory::Fetch);
    assert_eq!(rows[1].error_message, "profile section missing");

    let failed = list_failed_identifiers(&pool, run_id).await.unwrap();
    assert_eq!(failed.into_iter().collect::<Vec<_>>(), vec!["bob"]);
}

#[tokio::test]
async fn failed_identifiers_ignore_category() {
    let pool = test_pool().await;
    let run_id = running_run(&pool).await;

    append_failure(&pool, run_id, "carol", FailureCategory::Invalid, "private account")
        .await
        .unwrap();
    append_failure(&pool, run_id, "bob", FailureCategory::Fetch, "timeout")
        .await
        .unwrap();

    let failed = list_failed_identifiers(&pool, run_id).await.unwrap();
    assert_eq!(failed.into_iter().collect::<Vec<_>>(), vec!["bob", "carol"]);
}

#[tokio::test]
async fn failed_identifiers_exclude_later_successes_but_keep_history() {
    let pool = test_pool().await;
    let run_id = running_run(&pool).await;

    append_failure(&pool, run_id, "bob", FailureCategory::Fetch, "timeout")
        .await
        .unwrap();
    append_user_records(&pool, run_id, &records_for("bob", &[]))
        .await
        .unwrap();

    assert!(list_failed_identifiers(&pool, run_id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(list_failures(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_identifiers_are_scoped_to_run() {
    let pool = test_pool().await;
    let old_run = running_run(&pool).await;
    append_failure(&pool, old_run, "bob", FailureCategory::Fetch, "timeout")
        .await
        .unwrap();

    let new_run = running_run(&pool).await;
    assert!(list_failed_identifiers(&pool, new_run)
        .await
        .unwrap()
        .is_empty());
}
