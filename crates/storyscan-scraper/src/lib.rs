pub mod classify;
pub mod client;
pub mod error;
pub mod fetcher;
pub mod rate_limit;
pub mod types;

pub use classify::classify;
pub use client::StoryClient;
pub use error::ScraperError;
pub use fetcher::ProfileFetcher;
pub use rate_limit::Pacing;
pub use types::{RawResult, StoryPayload};
