//! Payload types for the story endpoint.
//!
//! Two payload shapes have been observed in the wild:
//!
//! ### Flat
//! ```json
//! { "user_info": { "username": "...", "followers": 12, ... },
//!   "stories": [ { "mentions": ["a", "b"] } ] }
//! ```
//!
//! ### Wrapped
//! ```json
//! { "userInfo": { "result": [ { "user": { "username": "...", "follower_count": 12 } } ] },
//!   "stories": { "result": [ { "story_bloks_stickers": [
//!       { "bloks_sticker": { "sticker_data": { "ig_mention": { "username": "a" } } } } ] } ] } }
//! ```
//!
//! The fetch layer only splits the document into its two sections. Both are
//! kept as raw JSON and decoded into the typed section structs below by the
//! classifier, so a malformed section becomes a classification outcome rather
//! than a fetch failure.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ScraperError;

/// Top-level response body of the story endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoryPayload {
    #[serde(default, alias = "userInfo")]
    pub user_info: Option<Value>,
    #[serde(default)]
    pub stories: Option<Value>,
}

/// What the fetch adapter handed back for one identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    Present(StoryPayload),
    /// The fetch failed or returned nothing; `reason` describes why.
    Absent { reason: String },
}

impl From<Result<StoryPayload, ScraperError>> for RawResult {
    fn from(result: Result<StoryPayload, ScraperError>) -> Self {
        match result {
            Ok(payload) => RawResult::Present(payload),
            Err(e) => RawResult::Absent {
                reason: e.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Typed sections, decoded by the classifier
// ---------------------------------------------------------------------------

/// Profile object as returned in either payload shape.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileInfo {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
    #[serde(default, alias = "follower_count")]
    pub followers: Option<Count>,
    #[serde(default, alias = "following_count")]
    pub following: Option<Count>,
}

/// `{ "result": [ { "user": { ... } } ] }`
#[derive(Debug, Deserialize)]
pub(crate) struct WrappedProfile {
    #[serde(default)]
    pub result: Vec<WrappedUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WrappedUser {
    #[serde(default)]
    pub user: Option<Value>,
}

/// Follower/following counts arrive as integers, floats, or numeric strings
/// depending on the upstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Count {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Count {
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn as_i64(&self) -> i64 {
        match self {
            Count::Int(n) => *n,
            Count::Float(f) if f.is_finite() => f.trunc() as i64,
            Count::Float(_) => 0,
            Count::Text(s) => s.trim().replace(',', "").parse::<i64>().unwrap_or(0),
        }
    }
}

/// Stories arrive either as a bare array or wrapped in `{ "result": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoriesSection {
    List(Vec<Story>),
    Wrapped {
        #[serde(default)]
        result: Vec<Story>,
    },
}

impl StoriesSection {
    pub(crate) fn into_stories(self) -> Vec<Story> {
        match self {
            StoriesSection::List(stories) | StoriesSection::Wrapped { result: stories } => stories,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Story {
    #[serde(default)]
    pub mentions: Vec<MentionRef>,
    #[serde(default)]
    pub story_bloks_stickers: Vec<BloksSticker>,
}

/// A mention is either a plain username or an object carrying one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MentionRef {
    Name(String),
    Object {
        #[serde(default)]
        username: Option<String>,
    },
}

impl MentionRef {
    pub(crate) fn username(&self) -> Option<&str> {
        match self {
            MentionRef::Name(name) => Some(name.as_str()),
            MentionRef::Object { username } => username.as_deref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BloksSticker {
    #[serde(default)]
    pub bloks_sticker: Option<BloksStickerBody>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BloksStickerBody {
    #[serde(default)]
    pub sticker_data: Option<StickerData>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StickerData {
    #[serde(default)]
    pub ig_mention: Option<IgMention>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IgMention {
    #[serde(default)]
    pub username: Option<String>,
}

impl BloksSticker {
    pub(crate) fn mention_username(&self) -> Option<&str> {
        self.bloks_sticker
            .as_ref()?
            .sticker_data
            .as_ref()?
            .ig_mention
            .as_ref()?
            .username
            .as_deref()
    }
}
