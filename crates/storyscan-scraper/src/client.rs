use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use reqwest::Client;
use storyscan_core::AppConfig;

use crate::error::ScraperError;
use crate::fetcher::ProfileFetcher;
use crate::rate_limit::retry_with_backoff;
use crate::types::StoryPayload;

/// HTTP client for the anonymous story-viewer endpoint.
///
/// Each lookup is a form `POST` carrying a single `auth` field derived from
/// the identifier and the configured secret. 429 and 5xx responses and
/// network failures are retried with jittered exponential backoff up to
/// `max_retries` additional attempts.
pub struct StoryClient {
    client: Client,
    endpoint: reqwest::Url,
    token_secret: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

/// Builds the `auth` form value: URL-safe base64 of `-1::{identifier}::{secret}`, unpadded.
pub(crate) fn encode_auth(identifier: &str, secret: &str) -> String {
    URL_SAFE_NO_PAD.encode(format!("-1::{identifier}::{secret}"))
}

impl StoryClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidEndpoint`] if `endpoint` is not an absolute http(s) URL.
    /// - [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        endpoint: &str,
        token_secret: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let endpoint = parse_endpoint(endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            token_secret: token_secret.to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Creates a client from the `STORYSCAN_API_*` and `STORYSCAN_SCRAPER_*` settings.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.api_url,
            &config.api_token_secret,
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_ms,
        )
    }

    /// Fetches the story payload for `identifier`, retrying transient errors.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status; 5xx is retried.
    /// - [`ScraperError::Http`]: network failure after all retries exhausted.
    /// - [`ScraperError::Deserialize`]: body is not a JSON object (not retried).
    pub async fn fetch_story(&self, identifier: &str) -> Result<StoryPayload, ScraperError> {
        let auth = encode_auth(identifier, &self.token_secret);

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let auth = auth.clone();
            async move {
                let url = self.endpoint.to_string();
                let response = self
                    .client
                    .post(self.endpoint.clone())
                    .form(&[("auth", auth.as_str())])
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok());
                    return Err(ScraperError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<StoryPayload>(&body).map_err(|e| {
                    ScraperError::Deserialize {
                        context: format!("story payload for {identifier}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }
}

#[async_trait]
impl ProfileFetcher for StoryClient {
    async fn fetch(&self, identifier: &str) -> Result<StoryPayload, ScraperError> {
        self.fetch_story(identifier).await
    }
}

fn parse_endpoint(endpoint: &str) -> Result<reqwest::Url, ScraperError> {
    let url = reqwest::Url::parse(endpoint).map_err(|e| ScraperError::InvalidEndpoint {
        url: endpoint.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidEndpoint {
            url: endpoint.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
