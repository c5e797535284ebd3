use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile fields extracted from a fetched story payload, normalized for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    /// Username reported by the remote profile (not necessarily the requested identifier).
    pub username: String,
    /// Display name; empty when the remote side omits it.
    pub full_name: String,
    pub is_private: bool,
    pub is_verified: bool,
    /// Avatar URL; empty when absent.
    pub profile_pic_url: String,
    pub follower_count: i64,
    pub following_count: i64,
}

/// Why an identifier landed in the failure log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureCategory {
    /// The fetch itself failed: transport error, bad status, or no payload.
    Fetch,
    /// The payload describes a definitive account state (private, no identity).
    Invalid,
    /// The payload arrived but was malformed or incomplete.
    Error,
}

impl FailureCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureCategory::Fetch => "fetch",
            FailureCategory::Invalid => "invalid",
            FailureCategory::Error => "error",
        }
    }

    /// Parses the persisted text form. Unknown values map to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fetch" => Some(FailureCategory::Fetch),
            "invalid" => Some(FailureCategory::Invalid),
            "error" => Some(FailureCategory::Error),
            _ => None,
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for one fetched identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Valid {
        profile: ProfileFields,
        /// Distinct mentioned usernames across every story of the profile.
        mentions: BTreeSet<String>,
    },
    /// Definitive account state; still retried by the orchestrator.
    Invalid { reason: String },
    /// Transient or fetch-level problem.
    Error {
        category: FailureCategory,
        reason: String,
    },
}

impl Outcome {
    /// Returns the failure category and reason, or `None` for `Valid`.
    #[must_use]
    pub fn failure(&self) -> Option<(FailureCategory, &str)> {
        match self {
            Outcome::Valid { .. } => None,
            Outcome::Invalid { reason } => Some((FailureCategory::Invalid, reason)),
            Outcome::Error { category, reason } => Some((*category, reason)),
        }
    }
}

/// One persisted success row: a profile paired with at most one mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// The identifier that was requested, which keys the row.
    pub identifier: String,
    pub profile: ProfileFields,
    pub mention: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl UserRecord {
    /// Expands a valid profile into one record per distinct mention, or a
    /// single record with `mention = None` when there are no mentions.
    #[must_use]
    pub fn fan_out(
        identifier: &str,
        profile: &ProfileFields,
        mentions: &BTreeSet<String>,
        captured_at: DateTime<Utc>,
    ) -> Vec<UserRecord> {
        let make = |mention: Option<String>| UserRecord {
            identifier: identifier.to_string(),
            profile: profile.clone(),
            mention,
            captured_at,
        };

        if mentions.is_empty() {
            return vec![make(None)];
        }
        mentions.iter().map(|m| make(Some(m.clone()))).collect()
    }
}
