use async_trait::async_trait;

use crate::error::ScraperError;
use crate::types::{RawResult, StoryPayload};

/// Source of story payloads for one identifier.
///
/// The batch processor only depends on this trait, so tests can substitute
/// canned payloads for the HTTP client.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// Fetches the payload for `identifier`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScraperError`] when nothing usable came back.
    async fn fetch(&self, identifier: &str) -> Result<StoryPayload, ScraperError>;

    /// Like [`Self::fetch`], but folds any error into [`RawResult::Absent`].
    async fn fetch_raw(&self, identifier: &str) -> RawResult {
        self.fetch(identifier).await.into()
    }
}
