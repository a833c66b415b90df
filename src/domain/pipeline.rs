use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Brand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    OpenAi,
    Gemini,
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Engine::OpenAi),
            "gemini" => Ok(Engine::Gemini),
            _ => Err(format!("Unknown engine: {} (expected openai or gemini)", s)),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::OpenAi => f.write_str("openai"),
            Engine::Gemini => f.write_str("gemini"),
        }
    }
}

/// Where the pipeline looks for source stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Rss,
    Brave,
    Both,
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rss" => Ok(SourceMode::Rss),
            "brave" => Ok(SourceMode::Brave),
            "both" => Ok(SourceMode::Both),
            _ => Err(format!("Unknown source: {} (expected rss, brave or both)", s)),
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Rss => f.write_str("rss"),
            SourceMode::Brave => f.write_str("brave"),
            SourceMode::Both => f.write_str("both"),
        }
    }
}

/// Body for `POST /api/ai-pipeline`. Omitting `brand` runs every brand.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRunRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<Brand>,
    pub engine: Engine,
    pub source: SourceMode,
}

/// Outcome of one brand's run, discriminated by its `status` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunResult {
    Created {
        brand: Brand,
        #[serde(default)]
        article_id: Option<String>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        slug: Option<String>,
    },
    NoResults {
        brand: Brand,
    },
    AllDuplicates {
        brand: Brand,
        #[serde(default)]
        checked: Option<u32>,
    },
    RewriteFailed {
        brand: Brand,
        #[serde(default)]
        error: Option<String>,
    },
    InsertFailed {
        brand: Brand,
        #[serde(default)]
        error: Option<String>,
    },
    Error {
        #[serde(default)]
        brand: Option<Brand>,
        #[serde(default)]
        error: Option<String>,
    },
}

impl RunResult {
    pub fn brand(&self) -> Option<Brand> {
        match self {
            RunResult::Created { brand, .. }
            | RunResult::NoResults { brand }
            | RunResult::AllDuplicates { brand, .. }
            | RunResult::RewriteFailed { brand, .. }
            | RunResult::InsertFailed { brand, .. } => Some(*brand),
            RunResult::Error { brand, .. } => *brand,
        }
    }

    pub fn status_tag(&self) -> &'static str {
        match self {
            RunResult::Created { .. } => "created",
            RunResult::NoResults { .. } => "no_results",
            RunResult::AllDuplicates { .. } => "all_duplicates",
            RunResult::RewriteFailed { .. } => "rewrite_failed",
            RunResult::InsertFailed { .. } => "insert_failed",
            RunResult::Error { .. } => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Created { .. })
    }

    /// One-line human summary for the control panel.
    pub fn summary(&self) -> String {
        let brand = self
            .brand()
            .map(|b| b.display_name().to_string())
            .unwrap_or_else(|| "all brands".to_string());

        match self {
            RunResult::Created { title, .. } => format!(
                "{}: created \"{}\"",
                brand,
                title.as_deref().unwrap_or("(untitled)")
            ),
            RunResult::NoResults { .. } => format!("{}: no source stories found", brand),
            RunResult::AllDuplicates { checked, .. } => match checked {
                Some(n) => format!("{}: all {} candidates already published", brand, n),
                None => format!("{}: all candidates already published", brand),
            },
            RunResult::RewriteFailed { error, .. } => {
                format!("{}: rewrite failed: {}", brand, error.as_deref().unwrap_or("unknown"))
            }
            RunResult::InsertFailed { error, .. } => {
                format!("{}: insert failed: {}", brand, error.as_deref().unwrap_or("unknown"))
            }
            RunResult::Error { error, .. } => {
                format!("{}: error: {}", brand, error.as_deref().unwrap_or("unknown"))
            }
        }
    }
}

/// Response of `GET /api/ai-pipeline`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineStatus {
    pub enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub articles_today: u32,
    pub recent: Vec<RunResult>,
}
