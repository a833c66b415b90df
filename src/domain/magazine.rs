//! Magazine issues and their page templates.
//!
//! Every page carries a `type` tag and a subset of optional attributes. Which
//! attributes belong to which template is fixed by [`PAGE_TYPE_FIELDS`]; the
//! editor only ever reads or writes the fields listed there.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::{CaviarError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    Cover,
    Toc,
    Article,
    Spread,
    Video,
    Ad,
    Artist,
    FullBleed,
    BackCover,
    Gallery,
    /// Templates this client does not know yet; carries no editable fields.
    #[serde(other)]
    Unknown,
}

impl PageType {
    /// Known templates, in editor order.
    pub const ALL: [PageType; 10] = [
        PageType::Cover,
        PageType::Toc,
        PageType::Article,
        PageType::Spread,
        PageType::Video,
        PageType::Ad,
        PageType::Artist,
        PageType::FullBleed,
        PageType::BackCover,
        PageType::Gallery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Cover => "cover",
            PageType::Toc => "toc",
            PageType::Article => "article",
            PageType::Spread => "spread",
            PageType::Video => "video",
            PageType::Ad => "ad",
            PageType::Artist => "artist",
            PageType::FullBleed => "full-bleed",
            PageType::BackCover => "back-cover",
            PageType::Gallery => "gallery",
            PageType::Unknown => "unknown",
        }
    }

    /// Fields the editor exposes for this template.
    pub fn fields(self) -> &'static [PageField] {
        PAGE_TYPE_FIELDS
            .iter()
            .find(|(page_type, _)| *page_type == self)
            .map(|(_, fields)| *fields)
            .unwrap_or(&[])
    }

    pub fn allows(self, field: PageField) -> bool {
        self.fields().contains(&field)
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PageType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        PageType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Unknown page type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageField {
    Title,
    Subtitle,
    Content,
    ImageUrl,
    VideoUrl,
    LinkUrl,
    PullQuote,
    Credits,
    TocEntries,
    ArtistLinks,
    GalleryImages,
}

impl PageField {
    pub const ALL: [PageField; 11] = [
        PageField::Title,
        PageField::Subtitle,
        PageField::Content,
        PageField::ImageUrl,
        PageField::VideoUrl,
        PageField::LinkUrl,
        PageField::PullQuote,
        PageField::Credits,
        PageField::TocEntries,
        PageField::ArtistLinks,
        PageField::GalleryImages,
    ];

    /// JSON key used by the pages endpoints.
    pub fn key(self) -> &'static str {
        match self {
            PageField::Title => "title",
            PageField::Subtitle => "subtitle",
            PageField::Content => "content",
            PageField::ImageUrl => "image_url",
            PageField::VideoUrl => "video_url",
            PageField::LinkUrl => "link_url",
            PageField::PullQuote => "pull_quote",
            PageField::Credits => "credits",
            PageField::TocEntries => "toc_entries",
            PageField::ArtistLinks => "artist_links",
            PageField::GalleryImages => "gallery_images",
        }
    }

    /// List-valued fields take a JSON array; the rest take text.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            PageField::TocEntries | PageField::ArtistLinks | PageField::GalleryImages
        )
    }
}

impl fmt::Display for PageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PageField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        PageField::ALL
            .into_iter()
            .find(|f| f.key() == normalized)
            .ok_or_else(|| format!("Unknown page field: {}", s))
    }
}

use PageField as F;

pub const PAGE_TYPE_FIELDS: &[(PageType, &[PageField])] = &[
    (PageType::Cover, &[F::Title, F::Subtitle, F::ImageUrl, F::Credits]),
    (PageType::Toc, &[F::Title, F::TocEntries]),
    (
        PageType::Article,
        &[F::Title, F::Subtitle, F::Content, F::ImageUrl, F::PullQuote, F::Credits],
    ),
    (PageType::Spread, &[F::Title, F::Content, F::ImageUrl, F::Credits]),
    (PageType::Video, &[F::Title, F::Content, F::VideoUrl]),
    (PageType::Ad, &[F::ImageUrl, F::LinkUrl]),
    (
        PageType::Artist,
        &[F::Title, F::Subtitle, F::Content, F::ImageUrl, F::ArtistLinks],
    ),
    (PageType::FullBleed, &[F::ImageUrl, F::Content, F::Credits]),
    (PageType::BackCover, &[F::Content, F::ImageUrl]),
    (PageType::Gallery, &[F::Title, F::GalleryImages, F::Credits]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagazinePage {
    pub id: String,
    #[serde(default)]
    pub issue_id: Option<String>,
    pub page_number: u32,
    #[serde(rename = "type")]
    pub page_type: PageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toc_entries: Option<Vec<TocEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_links: Option<Vec<ArtistLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_images: Option<Vec<GalleryImage>>,
}

impl MagazinePage {
    pub fn new(id: impl Into<String>, page_number: u32, page_type: PageType) -> Self {
        Self {
            id: id.into(),
            issue_id: None,
            page_number,
            page_type,
            title: None,
            subtitle: None,
            content: None,
            image_url: None,
            video_url: None,
            link_url: None,
            pull_quote: None,
            credits: None,
            toc_entries: None,
            artist_links: None,
            gallery_images: None,
        }
    }

    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) if !title.trim().is_empty() => title.clone(),
            _ => format!("Page {} ({})", self.page_number, self.page_type),
        }
    }

    pub fn has_field(&self, field: PageField) -> bool {
        match field {
            F::Title => self.title.is_some(),
            F::Subtitle => self.subtitle.is_some(),
            F::Content => self.content.is_some(),
            F::ImageUrl => self.image_url.is_some(),
            F::VideoUrl => self.video_url.is_some(),
            F::LinkUrl => self.link_url.is_some(),
            F::PullQuote => self.pull_quote.is_some(),
            F::Credits => self.credits.is_some(),
            F::TocEntries => self.toc_entries.is_some(),
            F::ArtistLinks => self.artist_links.is_some(),
            F::GalleryImages => self.gallery_images.is_some(),
        }
    }

    /// Populated fields that the page's template does not declare.
    pub fn undeclared_fields(&self) -> Vec<PageField> {
        PageField::ALL
            .into_iter()
            .filter(|f| self.has_field(*f) && !self.page_type.allows(*f))
            .collect()
    }

    /// Text value of a field, used when rendering a template.
    pub fn text(&self, field: PageField) -> Option<&str> {
        match field {
            F::Title => self.title.as_deref(),
            F::Subtitle => self.subtitle.as_deref(),
            F::Content => self.content.as_deref(),
            F::ImageUrl => self.image_url.as_deref(),
            F::VideoUrl => self.video_url.as_deref(),
            F::LinkUrl => self.link_url.as_deref(),
            F::PullQuote => self.pull_quote.as_deref(),
            F::Credits => self.credits.as_deref(),
            F::TocEntries | F::ArtistLinks | F::GalleryImages => None,
        }
    }

    /// First outbound link on the page, if any.
    pub fn primary_link(&self) -> Option<&str> {
        self.link_url
            .as_deref()
            .or(self.video_url.as_deref())
            .or_else(|| {
                self.artist_links
                    .as_ref()
                    .and_then(|links| links.first())
                    .map(|l| l.url.as_str())
            })
            .or(self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl IssueStatus {
    pub fn can_transition_to(self, next: IssueStatus) -> bool {
        matches!(
            (self, next),
            (IssueStatus::Draft, IssueStatus::Published)
                | (IssueStatus::Draft, IssueStatus::Archived)
                | (IssueStatus::Published, IssueStatus::Archived)
        )
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueStatus::Draft => f.write_str("draft"),
            IssueStatus::Published => f.write_str("published"),
            IssueStatus::Archived => f.write_str("archived"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagazineIssue {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub issue_number: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub status: IssueStatus,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub pages: Vec<MagazinePage>,
}

impl MagazineIssue {
    /// Pages in reading order.
    pub fn sorted_pages(&self) -> Vec<MagazinePage> {
        let mut pages = self.pages.clone();
        pages.sort_by_key(|p| p.page_number);
        pages
    }

    pub fn next_page_number(&self) -> u32 {
        self.pages.iter().map(|p| p.page_number).max().unwrap_or(0) + 1
    }

    pub fn numbering(&self) -> NumberingReport {
        NumberingReport::from_numbers(self.pages.iter().map(|p| p.page_number))
    }

    pub fn ensure_can_publish(&self) -> Result<()> {
        if !self.status.can_transition_to(IssueStatus::Published) {
            return Err(CaviarError::InvalidTransition {
                from: self.status.to_string(),
                to: IssueStatus::Published.to_string(),
            });
        }
        Ok(())
    }
}

/// Duplicates and holes in an issue's 1-based page numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingReport {
    pub duplicates: Vec<u32>,
    pub gaps: Vec<u32>,
}

impl NumberingReport {
    pub fn from_numbers(numbers: impl IntoIterator<Item = u32>) -> Self {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for n in numbers {
            *counts.entry(n).or_default() += 1;
        }

        let duplicates = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(n, _)| *n)
            .collect();

        let max = counts.keys().next_back().copied().unwrap_or(0);
        let gaps = (1..=max).filter(|n| !counts.contains_key(n)).collect();

        Self { duplicates, gaps }
    }

    pub fn is_contiguous(&self) -> bool {
        self.duplicates.is_empty() && self.gaps.is_empty()
    }
}

/// Body for `PATCH /api/magazine-issues/:id`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<u32>,
}

impl IssueUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.cover_image_url.is_none()
            && self.issue_number.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_page_type_has_a_schema() {
        for page_type in PageType::ALL {
            assert!(
                !page_type.fields().is_empty(),
                "{} has no declared fields",
                page_type
            );
        }
        assert_eq!(PAGE_TYPE_FIELDS.len(), PageType::ALL.len());
    }

    #[test]
    fn test_schema_lists_exact_fields() {
        assert_eq!(PageType::Toc.fields(), &[F::Title, F::TocEntries]);
        assert_eq!(PageType::Ad.fields(), &[F::ImageUrl, F::LinkUrl]);
        assert!(PageType::Gallery.allows(F::GalleryImages));
        assert!(!PageType::Cover.allows(F::GalleryImages));
        assert!(!PageType::Video.allows(F::ImageUrl));
    }

    #[test]
    fn test_page_type_serde_is_kebab_case() {
        let json = serde_json::to_string(&PageType::FullBleed).unwrap();
        assert_eq!(json, "\"full-bleed\"");
        assert_eq!("back_cover".parse::<PageType>().unwrap(), PageType::BackCover);
    }

    #[test]
    fn test_page_decodes_type_tag_and_optional_fields() {
        let page: MagazinePage = serde_json::from_str(
            r#"{"id":"p1","page_number":2,"type":"toc","title":"Contents",
                "toc_entries":[{"title":"Cover Story","page":4}]}"#,
        )
        .unwrap();
        assert_eq!(page.page_type, PageType::Toc);
        assert_eq!(page.toc_entries.as_ref().unwrap()[0].page, 4);
        assert!(page.undeclared_fields().is_empty());
    }

    #[test]
    fn test_undeclared_fields_detected() {
        let mut page = MagazinePage::new("p1", 1, PageType::Ad);
        page.image_url = Some("https://cdn.example.com/ad.jpg".into());
        page.pull_quote = Some("buy now".into());
        assert_eq!(page.undeclared_fields(), vec![F::PullQuote]);
    }

    #[test]
    fn test_numbering_report() {
        let report = NumberingReport::from_numbers([1, 2, 3, 4]);
        assert!(report.is_contiguous());

        let report = NumberingReport::from_numbers([1, 3, 3, 5]);
        assert_eq!(report.duplicates, vec![3]);
        assert_eq!(report.gaps, vec![2, 4]);
        assert!(!report.is_contiguous());

        assert!(NumberingReport::from_numbers(std::iter::empty()).is_contiguous());
    }

    #[test]
    fn test_issue_status_transitions() {
        assert!(IssueStatus::Draft.can_transition_to(IssueStatus::Published));
        assert!(IssueStatus::Published.can_transition_to(IssueStatus::Archived));
        assert!(!IssueStatus::Archived.can_transition_to(IssueStatus::Published));
        assert!(!IssueStatus::Published.can_transition_to(IssueStatus::Draft));
    }

    #[test]
    fn test_sorted_pages_and_next_number() {
        let issue = MagazineIssue {
            id: "i1".into(),
            slug: "issue-1".into(),
            title: "Issue 1".into(),
            issue_number: Some(1),
            description: None,
            cover_image_url: None,
            status: IssueStatus::Draft,
            published_at: None,
            pages: vec![
                MagazinePage::new("b", 2, PageType::Article),
                MagazinePage::new("a", 1, PageType::Cover),
            ],
        };
        let ids: Vec<_> = issue.sorted_pages().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(issue.next_page_number(), 3);
        assert!(issue.ensure_can_publish().is_ok());
    }

    #[test]
    fn test_unrecognised_page_type_keeps_issue_readable() {
        let json = r#"{"id":"i1","slug":"issue-1","title":"Issue 1","pages":[
            {"id":"a","page_number":1,"type":"cover","title":"Front"},
            {"id":"b","page_number":2,"type":"interview","title":"Q&A"}
        ]}"#;
        let issue: MagazineIssue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.pages.len(), 2);
        assert_eq!(issue.pages[1].page_type, PageType::Unknown);
        assert!(PageType::Unknown.fields().is_empty());
        assert_eq!(issue.pages[1].undeclared_fields(), vec![F::Title]);
        assert!("unknown".parse::<PageType>().is_err());
    }

    #[test]
    fn test_null_pages_and_status_decode_as_defaults() {
        let json = r#"{"id":"i1","slug":"issue-1","title":"Issue 1","status":null,"pages":null}"#;
        let issue: MagazineIssue = serde_json::from_str(json).unwrap();
        assert!(issue.pages.is_empty());
        assert_eq!(issue.status, IssueStatus::Draft);
    }
}
