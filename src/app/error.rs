use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaviarError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Feed fetch failed for {url}: HTTP {status}")]
    FeedFetch { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Field '{field}' is not part of the {page_type} page template")]
    InvalidField { page_type: String, field: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl CaviarError {
    /// True for errors that leave the caller free to continue with the next item.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CaviarError::Http(_) | CaviarError::Timeout(_) | CaviarError::FeedFetch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CaviarError>;
