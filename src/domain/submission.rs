use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::{CaviarError, Result};
use crate::domain::Brand;

/// Review lifecycle of a submission.
///
/// `pending → under_review → approved | rejected`, `approved → published`.
/// Pending pitches may also be decided without a review pass. `rejected` and
/// `published` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Published,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 5] = [
        SubmissionStatus::Pending,
        SubmissionStatus::UnderReview,
        SubmissionStatus::Approved,
        SubmissionStatus::Rejected,
        SubmissionStatus::Published,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Published => "published",
        }
    }

    pub fn next_states(self) -> &'static [SubmissionStatus] {
        use SubmissionStatus::*;
        match self {
            Pending => &[UnderReview, Approved, Rejected],
            UnderReview => &[Approved, Rejected],
            Approved => &[Published],
            Rejected | Published => &[],
        }
    }

    pub fn can_transition_to(self, next: SubmissionStatus) -> bool {
        self.next_states().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }

    pub fn transition(self, next: SubmissionStatus) -> Result<SubmissionStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CaviarError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        SubmissionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Unknown submission status: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub brand: Brand,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub links: Vec<String>,
    #[serde(default)]
    pub reviewer_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("(untitled)")
    }
}

/// Filters for `GET /api/submissions`.
#[derive(Debug, Clone, Default)]
pub struct SubmissionQuery {
    pub brand: Option<Brand>,
    pub kind: Option<String>,
    pub status: Option<SubmissionStatus>,
    pub per_page: Option<u32>,
}

impl SubmissionQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(brand) = self.brand {
            pairs.push(("brand", brand.to_string()));
        }
        if let Some(kind) = &self.kind {
            pairs.push(("type", kind.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        pairs
    }
}

/// Body for `PATCH /api/submissions/:id/review`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReview {
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubmissionStatus::*;

    #[test]
    fn test_pending_reachable_states() {
        assert!(Pending.can_transition_to(UnderReview));
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Published));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_published_only_after_approval() {
        assert!(Approved.can_transition_to(Published));
        assert!(!UnderReview.can_transition_to(Published));
        assert!(!Rejected.can_transition_to(Published));
    }

    #[test]
    fn test_terminal_states() {
        assert!(Published.is_terminal());
        assert!(Rejected.is_terminal());
        assert!(!Approved.is_terminal());
        for status in SubmissionStatus::ALL {
            assert!(!Published.can_transition_to(status));
        }
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let err = Pending.transition(Published).unwrap_err();
        assert_eq!(err.to_string(), "Invalid status transition: pending -> published");
        assert_eq!(Pending.transition(UnderReview).unwrap(), UnderReview);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("under-review".parse::<SubmissionStatus>().unwrap(), UnderReview);
        assert_eq!("Approved".parse::<SubmissionStatus>().unwrap(), Approved);
        assert!("archived".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn test_query_pairs_skip_unset_filters() {
        let query = SubmissionQuery {
            brand: Some(Brand::TrapGlow),
            status: Some(UnderReview),
            per_page: Some(25),
            ..Default::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("brand", "trapglow".to_string()),
                ("status", "under_review".to_string()),
                ("per_page", "25".to_string()),
            ]
        );
    }

    #[test]
    fn test_null_links_decode_as_empty() {
        let json = r#"{"id":"s1","brand":"saucewire","type":"story","status":"pending","links":null}"#;
        let submission: Submission = serde_json::from_str(json).unwrap();
        assert!(submission.links.is_empty());
        assert_eq!(submission.status, Pending);
    }
}
