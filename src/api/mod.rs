//! Client for the admin REST API.
//!
//! Every endpoint answers with JSON. Single resources and lists may come back
//! wrapped in an envelope (`{"issue": {...}}`, `{"feeds": [...]}`) or bare;
//! both shapes are accepted.

pub mod client;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::app::Result;
use crate::domain::{IssueUpdate, MagazineIssue, MagazinePage};

pub use client::ApiClient;

/// Issue and page operations used by the magazine editor.
#[async_trait]
pub trait MagazineApi: Send + Sync {
    async fn get_issue(&self, issue_id: &str) -> Result<MagazineIssue>;
    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> Result<MagazineIssue>;
    async fn publish_issue(&self, issue_id: &str) -> Result<MagazineIssue>;
    async fn create_page(&self, issue_id: &str, body: &Map<String, Value>) -> Result<MagazinePage>;
    async fn update_page(
        &self,
        issue_id: &str,
        page_id: &str,
        body: &Map<String, Value>,
    ) -> Result<MagazinePage>;
    async fn delete_page(&self, issue_id: &str, page_id: &str) -> Result<()>;
}
