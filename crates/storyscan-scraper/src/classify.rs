//! Classification of fetched payloads into [`Outcome`]s.
//!
//! Rules, in evaluation order:
//!
//! | Condition                                   | Outcome                     |
//! |---------------------------------------------|-----------------------------|
//! | fetch failed / nothing returned             | `Error` (`fetch`)           |
//! | profile section missing, null, not an object| `Error` (`error`)           |
//! | profile or stories section fails to decode  | `Error` (`error`)           |
//! | profile has no non-empty `username`         | `Invalid`                   |
//! | profile has `is_private = true`             | `Invalid`                   |
//! | otherwise                                   | `Valid`                     |
//!
//! Classification is pure: the same input always yields the same outcome.

use std::collections::BTreeSet;

use serde_json::Value;
use storyscan_core::{FailureCategory, Outcome, ProfileFields};

use crate::types::{ProfileInfo, RawResult, StoriesSection, StoryPayload, WrappedProfile};

pub const REASON_PROFILE_MISSING: &str = "profile section missing";
pub const REASON_USERNAME_MISSING: &str = "username field missing";
pub const REASON_PRIVATE_ACCOUNT: &str = "private account";

/// Classifies the fetch result for `identifier`.
#[must_use]
pub fn classify(identifier: &str, raw: &RawResult) -> Outcome {
    let outcome = match raw {
        RawResult::Absent { reason } => Outcome::Error {
            category: FailureCategory::Fetch,
            reason: format!("fetch failed: {reason}"),
        },
        RawResult::Present(payload) => classify_payload(payload),
    };

    if let Some((category, reason)) = outcome.failure() {
        tracing::debug!(identifier, %category, reason, "classified as failure");
    }
    outcome
}

fn classify_payload(payload: &StoryPayload) -> Outcome {
    let profile = match decode_profile(payload.user_info.as_ref()) {
        Ok(profile) => profile,
        Err(reason) => return malformed(reason),
    };

    let Some(username) = profile
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return Outcome::Invalid {
            reason: REASON_USERNAME_MISSING.to_string(),
        };
    };

    if profile.is_private == Some(true) {
        return Outcome::Invalid {
            reason: REASON_PRIVATE_ACCOUNT.to_string(),
        };
    }

    let mentions = match collect_mentions(payload.stories.as_ref()) {
        Ok(mentions) => mentions,
        Err(reason) => return malformed(reason),
    };

    Outcome::Valid {
        profile: ProfileFields {
            username: username.to_string(),
            full_name: profile.full_name.clone().unwrap_or_default(),
            is_private: profile.is_private.unwrap_or(false),
            is_verified: profile.is_verified.unwrap_or(false),
            profile_pic_url: profile.profile_pic_url.clone().unwrap_or_default(),
            follower_count: profile.followers.as_ref().map_or(0, |c| c.as_i64()),
            following_count: profile.following.as_ref().map_or(0, |c| c.as_i64()),
        },
        mentions,
    }
}

fn malformed(reason: String) -> Outcome {
    Outcome::Error {
        category: FailureCategory::Error,
        reason,
    }
}

/// Resolves the profile object from either payload shape and decodes it.
fn decode_profile(section: Option<&Value>) -> Result<ProfileInfo, String> {
    let value = match section {
        None | Some(Value::Null) => return Err(REASON_PROFILE_MISSING.to_string()),
        Some(value) => value,
    };
    let Some(map) = value.as_object() else {
        return Err("malformed profile: expected an object".to_string());
    };

    let object = if map.contains_key("result") {
        let wrapped: WrappedProfile = serde_json::from_value(value.clone())
            .map_err(|e| format!("malformed profile: {e}"))?;
        match wrapped.result.into_iter().next().and_then(|u| u.user) {
            Some(user) if user.is_object() => user,
            _ => return Err(REASON_PROFILE_MISSING.to_string()),
        }
    } else {
        value.clone()
    };

    serde_json::from_value::<ProfileInfo>(object).map_err(|e| format!("malformed profile: {e}"))
}

/// Union of every mention across every story; duplicates collapse.
fn collect_mentions(section: Option<&Value>) -> Result<BTreeSet<String>, String> {
    let mut mentions = BTreeSet::new();

    let stories = match section {
        None | Some(Value::Null) => return Ok(mentions),
        Some(value) => serde_json::from_value::<StoriesSection>(value.clone())
            .map_err(|e| format!("malformed stories: {e}"))?
            .into_stories(),
    };

    for story in &stories {
        let names = story
            .mentions
            .iter()
            .filter_map(|m| m.username())
            .chain(
                story
                    .story_bloks_stickers
                    .iter()
                    .filter_map(|s| s.mention_username()),
            );
        for name in names.map(str::trim).filter(|n| !n.is_empty()) {
            mentions.insert(name.to_string());
        }
    }

    Ok(mentions)
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
