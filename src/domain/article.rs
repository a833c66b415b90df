use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Brand, Engine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub brand: Brand,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub status: ArticleStatus,
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub ai_generated: bool,
    #[serde(default)]
    pub ai_engine: Option<Engine>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for `POST /api/articles`.
#[derive(Debug, Clone, Serialize)]
pub struct NewArticle {
    pub brand: Brand,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub status: ArticleStatus,
    pub ai_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_engine: Option<Engine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl NewArticle {
    pub fn new(brand: Brand, title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            brand,
            slug: slugify(&title),
            title,
            content: content.into(),
            excerpt: None,
            image_url: None,
            tags: Vec::new(),
            status: ArticleStatus::Draft,
            ai_generated: false,
            ai_engine: None,
            source_url: None,
        }
    }
}

/// Split a comma-separated tag string into trimmed, non-empty tags.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

/// Lowercase, ASCII-alphanumeric slug with single dashes between words.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '\'' || c == '\u{2019}' {
            // apostrophes fold into the word
        } else {
            pending_dash = true;
        }
    }

    slug
}
