use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "rate limited{}",
        .retry_after_secs.map_or_else(String::new, |s| format!(" (retry after {s}s)"))
    )]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid API endpoint \"{url}\": {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
