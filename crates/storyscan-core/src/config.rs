use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_DATABASE_URL: &str = "sqlite://storyscan.db?mode=rwc";
const DEFAULT_API_URL: &str = "https://anonstories.com/api/v1/story";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) storyscan/0.1";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = or_default("DATABASE_URL", DEFAULT_DATABASE_URL);
    let api_token_secret = require("STORYSCAN_API_TOKEN_SECRET")?;

    let log_level = or_default("STORYSCAN_LOG_LEVEL", "info");
    let input_path = PathBuf::from(or_default("STORYSCAN_INPUT_PATH", "./usernames.xlsx"));
    let input_sheet = lookup("STORYSCAN_INPUT_SHEET")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let report_path = PathBuf::from(or_default(
        "STORYSCAN_REPORT_PATH",
        "./storyscan-report.xlsx",
    ));
    let report_utc_offset = or_default("STORYSCAN_REPORT_UTC_OFFSET", "+03:30")
        .parse::<chrono::FixedOffset>()
        .map_err(|e| invalid("STORYSCAN_REPORT_UTC_OFFSET", e.to_string()))?;

    let db_max_connections = parse_u32("STORYSCAN_DB_MAX_CONNECTIONS", "5")?;
    let db_acquire_timeout_secs = parse_u64("STORYSCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let api_url = or_default("STORYSCAN_API_URL", DEFAULT_API_URL);
    let scraper_request_timeout_secs = parse_u64("STORYSCAN_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("STORYSCAN_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_max_retries = parse_u32("STORYSCAN_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_ms =
        parse_u64("STORYSCAN_SCRAPER_RETRY_BACKOFF_BASE_MS", "1000")?;

    let pacing_min_ms = parse_u64("STORYSCAN_PACING_MIN_MS", "1000")?;
    let pacing_max_ms = parse_u64("STORYSCAN_PACING_MAX_MS", "2000")?;
    if pacing_min_ms > pacing_max_ms {
        return Err(invalid(
            "STORYSCAN_PACING_MAX_MS",
            format!("must be >= STORYSCAN_PACING_MIN_MS ({pacing_min_ms})"),
        ));
    }

    let max_rounds = parse_u32("STORYSCAN_MAX_ROUNDS", "5")?;
    if max_rounds == 0 {
        return Err(invalid("STORYSCAN_MAX_ROUNDS", "must be at least 1".to_string()));
    }

    Ok(AppConfig {
        database_url,
        log_level,
        input_path,
        input_sheet,
        report_path,
        report_utc_offset,
        db_max_connections,
        db_acquire_timeout_secs,
        api_url,
        api_token_secret,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        pacing_min_ms,
        pacing_max_ms,
        max_rounds,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
