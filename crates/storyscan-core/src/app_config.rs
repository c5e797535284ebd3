use std::path::PathBuf;

use chrono::FixedOffset;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub input_path: PathBuf,
    pub input_sheet: Option<String>,
    pub report_path: PathBuf,
    /// Offset used when rendering capture timestamps in the exported report.
    pub report_utc_offset: FixedOffset,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub api_url: String,
    pub api_token_secret: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_ms: u64,
    pub pacing_min_ms: u64,
    pub pacing_max_ms: u64,
    /// Total `process_batch` calls allowed per run, initial pass included.
    pub max_rounds: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("log_level", &self.log_level)
            .field("input_path", &self.input_path)
            .field("input_sheet", &self.input_sheet)
            .field("report_path", &self.report_path)
            .field("report_utc_offset", &self.report_utc_offset)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("api_url", &self.api_url)
            .field("api_token_secret", &"[redacted]")
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_ms",
                &self.scraper_retry_backoff_base_ms,
            )
            .field("pacing_min_ms", &self.pacing_min_ms)
            .field("pacing_max_ms", &self.pacing_max_ms)
            .field("max_rounds", &self.max_rounds)
            .finish()
    }
}
