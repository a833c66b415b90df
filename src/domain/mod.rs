pub mod article;
pub mod brand;
pub mod feed;
pub mod magazine;
pub mod notification;
pub mod pipeline;
pub mod submission;

use serde::{Deserialize, Deserializer};

pub use article::{join_tags, parse_tags, slugify, Article, ArticleStatus, NewArticle};
pub use brand::Brand;
pub use feed::{FeedEntry, NewRssFeed, RssFeed, RssFeedUpdate};
pub use magazine::{
    ArtistLink, GalleryImage, IssueStatus, IssueUpdate, MagazineIssue, MagazinePage,
    NumberingReport, PageField, PageType, TocEntry, PAGE_TYPE_FIELDS,
};
pub use notification::{MarkRead, Notification, NotificationList};
pub use pipeline::{Engine, PipelineRunRequest, PipelineStatus, RunResult, SourceMode};
pub use submission::{Submission, SubmissionQuery, SubmissionReview, SubmissionStatus};

/// Reads an explicit `null` the same way as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
