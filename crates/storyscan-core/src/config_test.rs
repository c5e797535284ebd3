use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("STORYSCAN_API_TOKEN_SECRET", "test-secret");
    m
}

#[test]
fn build_app_config_fails_without_token_secret() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STORYSCAN_API_TOKEN_SECRET"),
        "expected MissingEnvVar(STORYSCAN_API_TOKEN_SECRET), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("expected Ok");
    assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.input_path.to_str(), Some("./usernames.xlsx"));
    assert!(cfg.input_sheet.is_none());
    assert_eq!(cfg.report_path.to_str(), Some("./storyscan-report.xlsx"));
    assert_eq!(cfg.report_utc_offset.local_minus_utc(), 3 * 3600 + 30 * 60);
    assert_eq!(cfg.db_max_connections, 5);
    assert_eq!(cfg.db_acquire_timeout_secs, 10);
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.api_token_secret, "test-secret");
    assert_eq!(cfg.scraper_request_timeout_secs, 30);
    assert_eq!(cfg.scraper_max_retries, 2);
    assert_eq!(cfg.scraper_retry_backoff_base_ms, 1000);
    assert_eq!(cfg.pacing_min_ms, 1000);
    assert_eq!(cfg.pacing_max_ms, 2000);
    assert_eq!(cfg.max_rounds, 5);
}

#[test]
fn debug_output_redacts_token_secret() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("test-secret"), "secret leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn blank_input_sheet_is_treated_as_unset() {
    let mut map = full_env();
    map.insert("STORYSCAN_INPUT_SHEET", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.input_sheet.is_none());
}

#[test]
fn input_sheet_override() {
    let mut map = full_env();
    map.insert("STORYSCAN_INPUT_SHEET", "user_list");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.input_sheet.as_deref(), Some("user_list"));
}

#[test]
fn report_utc_offset_override() {
    let mut map = full_env();
    map.insert("STORYSCAN_REPORT_UTC_OFFSET", "+00:00");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.report_utc_offset.local_minus_utc(), 0);
}

#[test]
fn report_utc_offset_invalid() {
    let mut map = full_env();
    map.insert("STORYSCAN_REPORT_UTC_OFFSET", "tehran");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORYSCAN_REPORT_UTC_OFFSET"),
        "expected InvalidEnvVar(STORYSCAN_REPORT_UTC_OFFSET), got: {result:?}"
    );
}

#[test]
fn pacing_window_override() {
    let mut map = full_env();
    map.insert("STORYSCAN_PACING_MIN_MS", "0");
    map.insert("STORYSCAN_PACING_MAX_MS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.pacing_min_ms, 0);
    assert_eq!(cfg.pacing_max_ms, 0);
}

#[test]
fn pacing_window_rejects_inverted_bounds() {
    let mut map = full_env();
    map.insert("STORYSCAN_PACING_MIN_MS", "3000");
    map.insert("STORYSCAN_PACING_MAX_MS", "1000");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORYSCAN_PACING_MAX_MS"),
        "expected InvalidEnvVar(STORYSCAN_PACING_MAX_MS), got: {result:?}"
    );
}

#[test]
fn pacing_min_invalid() {
    let mut map = full_env();
    map.insert("STORYSCAN_PACING_MIN_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORYSCAN_PACING_MIN_MS"),
        "expected InvalidEnvVar(STORYSCAN_PACING_MIN_MS), got: {result:?}"
    );
}

#[test]
fn max_rounds_override() {
    let mut map = full_env();
    map.insert("STORYSCAN_MAX_ROUNDS", "2");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_rounds, 2);
}

#[test]
fn max_rounds_rejects_zero() {
    let mut map = full_env();
    map.insert("STORYSCAN_MAX_ROUNDS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORYSCAN_MAX_ROUNDS"),
        "expected InvalidEnvVar(STORYSCAN_MAX_ROUNDS), got: {result:?}"
    );
}

#[test]
fn scraper_max_retries_invalid() {
    let mut map = full_env();
    map.insert("STORYSCAN_SCRAPER_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORYSCAN_SCRAPER_MAX_RETRIES"),
        "expected InvalidEnvVar(STORYSCAN_SCRAPER_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn scraper_user_agent_override() {
    let mut map = full_env();
    map.insert("STORYSCAN_SCRAPER_USER_AGENT", "custom-agent/2.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scraper_user_agent, "custom-agent/2.0");
}

#[test]
fn database_url_override() {
    let mut map = full_env();
    map.insert("DATABASE_URL", "sqlite::memory:");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.database_url, "sqlite::memory:");
}
