pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Brand, Engine, PageField, PageType, SourceMode, SubmissionStatus};

#[derive(Parser)]
#[command(name = "caviar")]
#[command(about = "Admin and reader tools for the Sauce Caviar network", long_about = None)]
pub struct Cli {
    /// Admin API base URL (overrides the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Number of parallel workers for testing feeds (overrides the config file)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage RSS sources
    Feeds {
        #[command(subcommand)]
        action: FeedsAction,
    },
    /// Inspect or trigger the AI pipeline
    Pipeline {
        #[command(subcommand)]
        action: PipelineAction,
    },
    /// Create articles
    Article {
        #[command(subcommand)]
        action: ArticleAction,
    },
    /// Edit magazine issues
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },
    /// Review community submissions
    Submissions {
        #[command(subcommand)]
        action: SubmissionsAction,
    },
    /// Admin notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationsAction,
    },
    /// Upload media files
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Read a magazine issue in the terminal
    Read { issue_id: String },
    /// Saved reading positions
    Reading {
        #[command(subcommand)]
        action: ReadingAction,
    },
}

#[derive(Subcommand)]
pub enum FeedsAction {
    /// List configured feeds
    List {
        #[arg(long)]
        brand: Option<Brand>,
    },
    /// Add a feed
    Add {
        #[arg(long)]
        brand: Brand,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Enable or disable a feed
    Toggle { id: String },
    /// Delete a feed
    Remove { id: String },
    /// Fetch feeds and show the entries they yield
    Test {
        /// Feed ids (default: every enabled feed)
        ids: Vec<String>,
        #[arg(long)]
        brand: Option<Brand>,
        /// Write fetch time and errors back to each feed
        #[arg(long)]
        report: bool,
    },
    /// Parse a local feed document
    Parse { file: PathBuf },
}

#[derive(Subcommand)]
pub enum PipelineAction {
    /// Show pipeline status and recent runs
    Status,
    /// Trigger a run
    Run {
        /// Limit to one brand (default: all brands)
        #[arg(long)]
        brand: Option<Brand>,
        #[arg(long, default_value = "openai")]
        engine: Engine,
        #[arg(long, default_value = "rss")]
        source: SourceMode,
    },
}

#[derive(Subcommand)]
pub enum ArticleAction {
    /// Create an article from a content file
    Create {
        #[arg(long)]
        brand: Brand,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content_file: PathBuf,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        publish: bool,
    },
}

#[derive(Args)]
pub struct PageValues {
    /// Field assignment such as `title=Intro` or `toc_entries=[...]`
    #[arg(long = "set", value_parser = parse_assignment)]
    pub values: Vec<(PageField, String)>,
}

#[derive(Subcommand)]
pub enum IssueAction {
    /// Show an issue and its pages
    Show { id: String },
    /// Update issue metadata
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        cover_image: Option<String>,
        #[arg(long)]
        issue_number: Option<u32>,
    },
    /// Publish a draft issue
    Publish { id: String },
    /// Report duplicate or missing page numbers
    Check { id: String },
    /// List the fields a page template accepts
    Fields {
        /// Page type (default: all)
        page_type: Option<PageType>,
    },
    /// Append a page
    AddPage {
        id: String,
        #[arg(long = "type")]
        page_type: PageType,
        #[command(flatten)]
        values: PageValues,
    },
    /// Edit fields of an existing page
    EditPage {
        id: String,
        page_id: String,
        #[command(flatten)]
        values: PageValues,
    },
    /// Delete a page
    RemovePage { id: String, page_id: String },
    /// Swap a page with its neighbour
    Swap {
        id: String,
        page_number: u32,
        #[arg(long, conflicts_with = "down", required_unless_present = "down")]
        up: bool,
        #[arg(long)]
        down: bool,
    },
}

#[derive(Subcommand)]
pub enum SubmissionsAction {
    /// List submissions
    List {
        #[arg(long)]
        brand: Option<Brand>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        status: Option<SubmissionStatus>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Move a submission to a new status
    Review {
        id: String,
        status: SubmissionStatus,
        /// Current status, skips the lookup
        #[arg(long)]
        current: Option<SubmissionStatus>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// List notifications
    List,
    /// Mark notifications read
    Read {
        ids: Vec<String>,
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },
    /// Poll and print new notifications until interrupted
    Watch {
        /// Poll interval (e.g. "30s", "5m"; default from config)
        #[arg(short, long)]
        interval: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReadingAction {
    /// List saved reading positions
    List,
    /// Forget the saved position of an issue
    Clear { slug: String },
}

fn parse_assignment(s: &str) -> Result<(PageField, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected field=value, got '{}'", s))?;
    Ok((field.trim().parse()?, value.to_string()))
}
