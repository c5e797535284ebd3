//! Offline unit tests for storyscan-db pool configuration and row types.
//! These tests do not open a database.

use std::path::PathBuf;

use chrono::{FixedOffset, Utc};
use storyscan_core::{AppConfig, FailureCategory};
use storyscan_db::{FailureRow, PoolConfig, ScrapeRunRow};

fn make_app_config(db_max_connections: u32) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        log_level: "info".to_string(),
        input_path: PathBuf::from("./usernames.xlsx"),
        input_sheet: None,
        report_path: PathBuf::from("./report.xlsx"),
        report_utc_offset: FixedOffset::east_opt(0).unwrap(),
        db_max_connections,
        db_acquire_timeout_secs: 9,
        api_url: "http://localhost/story".to_string(),
        api_token_secret: "secret".to_string(),
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_max_retries: 0,
        scraper_retry_backoff_base_ms: 0,
        pacing_min_ms: 0,
        pacing_max_ms: 0,
        max_rounds: 5,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&make_app_config(42));
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn pool_config_never_drops_below_one_connection() {
    let pool_config = PoolConfig::from_app_config(&make_app_config(0));
    assert_eq!(pool_config.max_connections, 1);
}

/// Compile-time smoke test: confirm that [`ScrapeRunRow`] has all expected
/// fields with the correct types.
#[test]
fn scrape_run_row_has_expected_fields() {
    let row = ScrapeRunRow {
        id: 1_i64,
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        identifiers_total: 3,
        rounds_executed: 0,
        success_count: 0,
        fail_count: 0,
        started_at: None,
        completed_at: None,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.trigger_source, "cli");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.error_message.is_none());
}

#[test]
fn failure_row_parses_known_category() {
    let row = FailureRow {
        id: 1,
        run_id: 1,
        username: "bob".to_string(),
        category: "fetch".to_string(),
        error_message: "HTTP error".to_string(),
        captured_at: Utc::now(),
    };
    assert_eq!(row.category().unwrap(), FailureCategory::Fetch);
}

#[test]
fn failure_row_rejects_unknown_category() {
    let row = FailureRow {
        id: 1,
        run_id: 1,
        username: "bob".to_string(),
        category: "mystery".to_string(),
        error_message: "?".to_string(),
        captured_at: Utc::now(),
    };
    assert!(row.category().is_err());
}
