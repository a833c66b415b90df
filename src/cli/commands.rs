use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app::{AppContext, CaviarError, Result};
use crate::domain::{
    parse_tags, ArticleStatus, Brand, FeedEntry, IssueUpdate, MagazineIssue, MarkRead, NewArticle,
    NewRssFeed, PageField, PageType, PipelineRunRequest, RssFeedUpdate, SubmissionQuery,
    SubmissionReview, SubmissionStatus, PAGE_TYPE_FIELDS,
};
use crate::editor::{MoveDirection, SwapOutcome};
use crate::fetcher::parallel::FeedTestSummary;
use crate::poller::{parse_interval, NotificationPoller};

// Feeds

pub async fn list_feeds(ctx: &AppContext, brand: Option<Brand>) -> Result<()> {
    let feeds = ctx.api.list_feeds(brand).await?;

    if feeds.is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for feed in feeds {
        let marker = if feed.enabled { "*" } else { " " };
        println!(
            "{} {}  [{}] {} - {}",
            marker,
            feed.id,
            feed.brand,
            feed.display_title(),
            feed.url
        );
        if let Some(error) = &feed.fetch_error {
            println!("      last error: {}", error);
        }
    }
    Ok(())
}

pub async fn add_feed(
    ctx: &AppContext,
    brand: Brand,
    name: &str,
    url: &str,
    category: Option<String>,
) -> Result<()> {
    url::Url::parse(url)?;

    let feed = ctx
        .api
        .create_feed(&NewRssFeed {
            brand,
            name: name.to_string(),
            url: url.to_string(),
            category,
            enabled: true,
        })
        .await?;
    println!("Added feed {} ({})", feed.display_title(), feed.id);
    Ok(())
}

pub async fn toggle_feed(ctx: &AppContext, id: &str) -> Result<()> {
    let feed = ctx
        .api
        .list_feeds(None)
        .await?
        .into_iter()
        .find(|f| f.id == id)
        .ok_or_else(|| CaviarError::NotFound(format!("feed {}", id)))?;

    let update = RssFeedUpdate {
        enabled: Some(!feed.enabled),
        ..Default::default()
    };
    let updated = ctx.api.update_feed(id, &update).await?;
    println!(
        "{} {}",
        if updated.enabled { "Enabled" } else { "Disabled" },
        updated.display_title()
    );
    Ok(())
}

pub async fn remove_feed(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.api.delete_feed(id).await?;
    println!("Removed feed {}", id);
    Ok(())
}

pub async fn test_feeds(
    ctx: &AppContext,
    ids: &[String],
    brand: Option<Brand>,
    report: bool,
) -> Result<()> {
    let feeds: Vec<_> = ctx
        .api
        .list_feeds(brand)
        .await?
        .into_iter()
        .filter(|f| {
            if ids.is_empty() {
                f.enabled
            } else {
                ids.contains(&f.id)
            }
        })
        .collect();

    if feeds.is_empty() {
        println!("No feeds to test");
        return Ok(());
    }

    println!("Testing {} feeds...", feeds.len());
    let outcomes = ctx.feed_tester.test_all(feeds).await;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(entries) => {
                println!("  {}: {} entries", outcome.feed.display_title(), entries.len());
                for entry in entries {
                    println!("    - {}", entry.title);
                }
            }
            Err(e) => eprintln!("  Error testing {}: {}", outcome.feed.display_title(), e),
        }
    }

    if report {
        for outcome in &outcomes {
            if let Err(e) = ctx.api.update_feed(&outcome.feed.id, &outcome.to_update()).await {
                tracing::warn!("Could not record test result for {}: {}", outcome.feed.id, e);
            }
        }
    }

    let summary = FeedTestSummary::from_outcomes(&outcomes);
    println!(
        "Test complete: {} ok, {} failed, {} entries ({} distinct)",
        summary.succeeded, summary.failed, summary.entries, summary.distinct_entries
    );
    Ok(())
}

pub fn parse_feed_file(ctx: &AppContext, path: &Path) -> Result<()> {
    let body = std::fs::read(path)?;
    let entries = ctx.parser.parse_bytes(&body);

    if entries.is_empty() {
        println!("No entries found");
        return Ok(());
    }

    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

fn print_entry(entry: &FeedEntry) {
    println!("{}", entry.title);
    println!("  {}", entry.url);
    if !entry.description.is_empty() {
        println!("  {}", entry.description);
    }
}

// Pipeline

pub async fn pipeline_status(ctx: &AppContext) -> Result<()> {
    let status = ctx.api.pipeline_status().await?;

    println!("Pipeline: {}", if status.enabled { "enabled" } else { "disabled" });
    match status.last_run_at {
        Some(at) => println!("Last run: {}", at.format("%Y-%m-%d %H:%M")),
        None => println!("Last run: never"),
    }
    println!("Articles today: {}", status.articles_today);

    if !status.recent.is_empty() {
        println!("Recent:");
        for result in &status.recent {
            println!("  {}", result.summary());
        }
    }
    Ok(())
}

pub async fn run_pipeline(ctx: &AppContext, request: &PipelineRunRequest) -> Result<()> {
    let target = request
        .brand
        .map(|b| b.display_name().to_string())
        .unwrap_or_else(|| "all brands".to_string());
    println!(
        "Running pipeline for {} ({}, {})...",
        target, request.engine, request.source
    );

    let results = ctx.api.run_pipeline(request).await?;
    if results.is_empty() {
        println!("No results");
        return Ok(());
    }

    let created = results.iter().filter(|r| r.is_success()).count();
    for result in &results {
        if result.is_success() {
            println!("  {}", result.summary());
        } else {
            eprintln!("  {}", result.summary());
        }
    }
    println!("Run complete: {} of {} brands produced an article", created, results.len());
    Ok(())
}

// Articles

pub struct ArticleDraft {
    pub brand: Brand,
    pub title: String,
    pub content_file: PathBuf,
    pub tags: Option<String>,
    pub excerpt: Option<String>,
    pub publish: bool,
}

pub async fn create_article(ctx: &AppContext, draft: ArticleDraft) -> Result<()> {
    let content = std::fs::read_to_string(&draft.content_file)?;

    let mut article = NewArticle::new(draft.brand, draft.title, content);
    article.tags = draft.tags.as_deref().map(parse_tags).unwrap_or_default();
    article.excerpt = draft.excerpt;
    if draft.publish {
        article.status = ArticleStatus::Published;
    }

    let created = ctx.api.create_article(&article).await?;
    println!("Created article {} ({})", created.slug, created.id);
    Ok(())
}

// Magazine issues

pub async fn show_issue(ctx: &AppContext, id: &str) -> Result<()> {
    let issue = ctx.editor().load(id).await?;
    print_issue(&issue);
    Ok(())
}

fn print_issue(issue: &MagazineIssue) {
    match issue.issue_number {
        Some(n) => println!("#{} {} ({})", n, issue.title, issue.slug),
        None => println!("{} ({})", issue.title, issue.slug),
    }
    println!("Status: {}", issue.status);
    if let Some(description) = &issue.description {
        println!("{}", description);
    }

    for page in issue.sorted_pages() {
        println!(
            "  {:>3}  {:<11} {}  [{}]",
            page.page_number,
            page.page_type,
            page.display_title(),
            page.id
        );
    }
}

pub async fn update_issue(ctx: &AppContext, id: &str, update: &IssueUpdate) -> Result<()> {
    let issue = ctx.editor().update_metadata(id, update).await?;
    println!("Updated {}", issue.title);
    Ok(())
}

pub async fn publish_issue(ctx: &AppContext, id: &str) -> Result<()> {
    let editor = ctx.editor();
    let issue = editor.load(id).await?;
    let published = editor.publish(&issue).await?;
    println!("Published {} ({})", published.title, published.slug);
    Ok(())
}

pub async fn check_issue(ctx: &AppContext, id: &str) -> Result<()> {
    let issue = ctx.editor().load(id).await?;
    let report = issue.numbering();

    if report.is_contiguous() {
        println!("{} pages numbered 1-{}", issue.pages.len(), issue.pages.len());
        return Ok(());
    }

    if !report.duplicates.is_empty() {
        println!("Duplicate page numbers: {}", join_numbers(&report.duplicates));
    }
    if !report.gaps.is_empty() {
        println!("Missing page numbers: {}", join_numbers(&report.gaps));
    }
    Ok(())
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn page_fields(page_type: Option<PageType>) {
    for (kind, fields) in PAGE_TYPE_FIELDS {
        if page_type.is_some_and(|t| t != *kind) {
            continue;
        }
        let names: Vec<String> = fields
            .iter()
            .map(|f| {
                if f.is_list() {
                    format!("{} (json)", f)
                } else {
                    f.to_string()
                }
            })
            .collect();
        println!("{:<11} {}", kind, names.join(", "));
    }
}

pub async fn add_page(
    ctx: &AppContext,
    id: &str,
    page_type: PageType,
    values: &[(PageField, String)],
) -> Result<()> {
    let editor = ctx.editor();
    let issue = editor.load(id).await?;
    let page = editor.add_page(&issue, page_type, values).await?;
    println!("Added {} page {} ({})", page.page_type, page.page_number, page.id);
    Ok(())
}

pub async fn edit_page(
    ctx: &AppContext,
    id: &str,
    page_id: &str,
    values: &[(PageField, String)],
) -> Result<()> {
    let editor = ctx.editor();
    let issue = editor.load(id).await?;
    let page = issue
        .pages
        .iter()
        .find(|p| p.id == page_id)
        .ok_or_else(|| CaviarError::NotFound(format!("page {}", page_id)))?;

    let updated = editor.edit_page(id, page, values).await?;
    println!("Updated page {} ({})", updated.page_number, updated.display_title());
    Ok(())
}

pub async fn remove_page(ctx: &AppContext, id: &str, page_id: &str) -> Result<()> {
    ctx.editor().remove_page(id, page_id).await?;
    println!("Removed page {}", page_id);
    Ok(())
}

pub async fn swap_page(
    ctx: &AppContext,
    id: &str,
    page_number: u32,
    direction: MoveDirection,
) -> Result<()> {
    let editor = ctx.editor();
    let issue = editor.load(id).await?;

    match editor.move_page(&issue, page_number, direction).await? {
        SwapOutcome::Swapped => {
            println!("Moved page {} {}", page_number, direction);
            Ok(())
        }
        SwapOutcome::Partial {
            applied_page_id,
            failed_page_id,
            error,
        } => {
            eprintln!(
                "Swap half-applied: page {} moved but page {} did not ({})",
                applied_page_id, failed_page_id, error
            );
            eprintln!("Run `caviar issue check {}` and fix the numbering", id);
            Err(error)
        }
        SwapOutcome::Failed { mut errors } => {
            for e in &errors {
                eprintln!("  {}", e);
            }
            Err(errors.remove(0))
        }
    }
}

// Submissions

pub async fn list_submissions(ctx: &AppContext, query: &SubmissionQuery) -> Result<()> {
    let page = ctx.api.list_submissions(query).await?;

    if page.submissions.is_empty() {
        println!("No submissions");
        return Ok(());
    }

    for submission in &page.submissions {
        println!(
            "{}  [{}] {:<12} {:<8} {}",
            submission.id,
            submission.brand,
            submission.status,
            submission.kind,
            submission.display_title()
        );
    }
    if let Some(total) = page.total {
        println!("{} of {} shown", page.submissions.len(), total);
    }
    Ok(())
}

pub async fn review_submission(
    ctx: &AppContext,
    id: &str,
    status: SubmissionStatus,
    current: Option<SubmissionStatus>,
    notes: Option<String>,
) -> Result<()> {
    let current = match current {
        Some(s) => Some(s),
        None => lookup_submission_status(ctx, id).await?,
    };

    match current {
        Some(from) => {
            from.transition(status)?;
        }
        None => tracing::warn!("Submission {} not in the first page of results, status unchecked", id),
    }

    let review = SubmissionReview {
        status,
        reviewer_notes: notes,
    };
    let updated = ctx.api.review_submission(id, &review).await?;
    println!("{} is now {}", updated.display_title(), updated.status);
    Ok(())
}

async fn lookup_submission_status(ctx: &AppContext, id: &str) -> Result<Option<SubmissionStatus>> {
    let query = SubmissionQuery {
        per_page: Some(100),
        ..Default::default()
    };
    let page = ctx.api.list_submissions(&query).await?;
    Ok(page.submissions.iter().find(|s| s.id == id).map(|s| s.status))
}

// Notifications

pub async fn list_notifications(ctx: &AppContext) -> Result<()> {
    let list = ctx.api.notifications().await?;

    if list.notifications.is_empty() {
        println!("No notifications");
        return Ok(());
    }

    println!("{} unread", list.unread_count);
    for n in &list.notifications {
        let marker = if n.read { " " } else { "*" };
        let when = n
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{} {}  {:<16} {}", marker, n.id, when, n.title);
    }
    Ok(())
}

pub async fn mark_notifications_read(ctx: &AppContext, ids: Vec<String>, all: bool) -> Result<()> {
    let mark = if all {
        MarkRead::All { all: true }
    } else if ids.is_empty() {
        return Err(CaviarError::Other("Pass notification ids or --all".into()));
    } else {
        MarkRead::Ids { ids }
    };

    ctx.api.mark_notifications_read(&mark).await?;
    println!("Marked notifications read");
    Ok(())
}

pub async fn watch_notifications(ctx: &AppContext, interval: Option<&str>) -> Result<()> {
    let raw = interval.unwrap_or(ctx.config.notifications.poll_interval.as_str());
    let interval: Duration = parse_interval(raw).map_err(CaviarError::Config)?;

    NotificationPoller::new(Arc::clone(&ctx.api), interval)
        .run()
        .await
}

// Uploads

pub async fn upload_files(ctx: &AppContext, files: &[PathBuf]) -> Result<()> {
    let results = ctx.api.upload_many(files).await;
    let mut failed = 0;

    for (path, result) in results {
        match result {
            Ok(url) => println!("{} -> {}", path.display(), url),
            Err(e) => {
                failed += 1;
                eprintln!("Error uploading {}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(CaviarError::Other(format!("{} uploads failed", failed)));
    }
    Ok(())
}

// Reading positions

pub fn list_reading(ctx: &AppContext) -> Result<()> {
    let positions = ctx.positions().list()?;

    if positions.is_empty() {
        println!("No saved reading positions");
        return Ok(());
    }

    for (slug, index) in positions {
        println!("{}  page index {}", slug, index);
    }
    Ok(())
}

pub fn clear_reading(ctx: &AppContext, slug: &str) -> Result<()> {
    if ctx.positions().clear(slug)? {
        println!("Cleared reading position for {}", slug);
    } else {
        println!("No saved position for {}", slug);
    }
    Ok(())
}
