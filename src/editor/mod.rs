//! Admin-side editing of magazine issues.
//!
//! Page reordering swaps `page_number` between two pages with two concurrent
//! PATCH requests. The backend offers no transaction, so one request can land
//! while the other fails; [`SwapOutcome::Partial`] reports that case and the
//! issue is left with a duplicate page number until someone fixes it.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::api::MagazineApi;
use crate::app::{CaviarError, Result};
use crate::domain::{
    ArtistLink, GalleryImage, IssueUpdate, MagazineIssue, MagazinePage, PageField, PageType,
    TocEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDirection::Up => f.write_str("up"),
            MoveDirection::Down => f.write_str("down"),
        }
    }
}

#[derive(Debug)]
pub enum SwapOutcome {
    Swapped,
    /// Exactly one PATCH landed.
    Partial {
        applied_page_id: String,
        failed_page_id: String,
        error: CaviarError,
    },
    Failed {
        errors: Vec<CaviarError>,
    },
}

impl SwapOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, SwapOutcome::Swapped)
    }
}

pub struct MagazineEditor {
    api: Arc<dyn MagazineApi>,
}

impl MagazineEditor {
    pub fn new(api: Arc<dyn MagazineApi>) -> Self {
        Self { api }
    }

    pub async fn load(&self, issue_id: &str) -> Result<MagazineIssue> {
        self.api.get_issue(issue_id).await
    }

    pub async fn update_metadata(&self, issue_id: &str, update: &IssueUpdate) -> Result<MagazineIssue> {
        if update.is_empty() {
            return Err(CaviarError::Other("Nothing to update".into()));
        }
        self.api.update_issue(issue_id, update).await
    }

    pub async fn publish(&self, issue: &MagazineIssue) -> Result<MagazineIssue> {
        issue.ensure_can_publish()?;
        let published = self.api.publish_issue(&issue.id).await?;
        tracing::info!("Published issue {} ({})", issue.title, issue.id);
        Ok(published)
    }

    pub async fn add_page(
        &self,
        issue: &MagazineIssue,
        page_type: PageType,
        values: &[(PageField, String)],
    ) -> Result<MagazinePage> {
        let mut body = page_form(page_type, values)?;
        body.insert("type".into(), Value::String(page_type.as_str().into()));
        body.insert("page_number".into(), Value::from(issue.next_page_number()));
        self.api.create_page(&issue.id, &body).await
    }

    pub async fn edit_page(
        &self,
        issue_id: &str,
        page: &MagazinePage,
        values: &[(PageField, String)],
    ) -> Result<MagazinePage> {
        let body = page_form(page.page_type, values)?;
        self.api.update_page(issue_id, &page.id, &body).await
    }

    pub async fn remove_page(&self, issue_id: &str, page_id: &str) -> Result<()> {
        self.api.delete_page(issue_id, page_id).await
    }

    /// Exchange the page numbers of two pages. Both PATCHes are in flight at
    /// once and nothing is rolled back.
    pub async fn swap_pages(&self, issue_id: &str, a: &MagazinePage, b: &MagazinePage) -> SwapOutcome {
        let body_a = page_number_body(b.page_number);
        let body_b = page_number_body(a.page_number);

        let (res_a, res_b) = futures::join!(
            self.api.update_page(issue_id, &a.id, &body_a),
            self.api.update_page(issue_id, &b.id, &body_b),
        );

        match (res_a, res_b) {
            (Ok(_), Ok(_)) => SwapOutcome::Swapped,
            (Ok(_), Err(error)) => {
                tracing::warn!(
                    "Page swap half-applied in issue {}: page {} moved, page {} did not",
                    issue_id,
                    a.id,
                    b.id
                );
                SwapOutcome::Partial {
                    applied_page_id: a.id.clone(),
                    failed_page_id: b.id.clone(),
                    error,
                }
            }
            (Err(error), Ok(_)) => {
                tracing::warn!(
                    "Page swap half-applied in issue {}: page {} moved, page {} did not",
                    issue_id,
                    b.id,
                    a.id
                );
                SwapOutcome::Partial {
                    applied_page_id: b.id.clone(),
                    failed_page_id: a.id.clone(),
                    error,
                }
            }
            (Err(e1), Err(e2)) => SwapOutcome::Failed {
                errors: vec![e1, e2],
            },
        }
    }

    /// Swap the page at `page_number` with its neighbour in reading order.
    pub async fn move_page(
        &self,
        issue: &MagazineIssue,
        page_number: u32,
        direction: MoveDirection,
    ) -> Result<SwapOutcome> {
        let pages = issue.sorted_pages();
        let index = pages
            .iter()
            .position(|p| p.page_number == page_number)
            .ok_or_else(|| CaviarError::NotFound(format!("page {}", page_number)))?;

        let neighbour = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|i| *i < pages.len()),
        }
        .ok_or_else(|| CaviarError::Other(format!("Page {} cannot move further", page_number)))?;

        Ok(self.swap_pages(&issue.id, &pages[index], &pages[neighbour]).await)
    }
}

fn page_number_body(page_number: u32) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("page_number".into(), Value::from(page_number));
    body
}

/// Build a page body holding only fields the template declares.
///
/// Text fields take the raw string, an empty string clears the field. List
/// fields take a JSON array that must match the field's item shape.
pub fn page_form(page_type: PageType, values: &[(PageField, String)]) -> Result<Map<String, Value>> {
    let mut body = Map::new();

    for (field, raw) in values {
        if !page_type.allows(*field) {
            return Err(CaviarError::InvalidField {
                page_type: page_type.to_string(),
                field: field.to_string(),
            });
        }

        let value = if field.is_list() {
            parse_list_field(*field, raw)?
        } else if raw.trim().is_empty() {
            Value::Null
        } else {
            Value::String(raw.clone())
        };

        body.insert(field.key().to_string(), value);
    }

    Ok(body)
}

fn parse_list_field(field: PageField, raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Array(Vec::new()));
    }

    let value: Value = serde_json::from_str(raw)?;
    // Round-trip through the typed shape so malformed items are caught here.
    match field {
        PageField::TocEntries => {
            serde_json::from_value::<Vec<TocEntry>>(value.clone())?;
        }
        PageField::ArtistLinks => {
            serde_json::from_value::<Vec<ArtistLink>>(value.clone())?;
        }
        PageField::GalleryImages => {
            serde_json::from_value::<Vec<GalleryImage>>(value.clone())?;
        }
        _ => {}
    }
    Ok(value)
}
