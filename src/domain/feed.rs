use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::Brand;

/// Brand-scoped RSS source as stored by the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssFeed {
    pub id: String,
    pub brand: Brand,
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub last_fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fetch_error: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_enabled() -> bool {
    true
}

impl RssFeed {
    pub fn display_title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRssFeed {
    pub brand: Brand,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub enabled: bool,
}

/// Partial update; `None` fields are left out of the PATCH body.
///
/// `fetch_error` is double-wrapped so a successful test can clear it with `null`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RssFeedUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<Option<String>>,
}

/// A candidate article pulled out of a feed body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl FeedEntry {
    /// Stable identity for cross-feed dedup, keyed on the normalized URL.
    pub fn fingerprint(&self) -> String {
        let normalized = self.url.trim().trim_end_matches('/').to_lowercase();
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hex::encode(hasher.finalize())
    }
}
