use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use caviar::app::AppContext;
use caviar::cli::commands::{self, ArticleDraft};
use caviar::cli::{
    ArticleAction, Cli, Commands, FeedsAction, IssueAction, NotificationsAction, PipelineAction,
    ReadingAction, SubmissionsAction,
};
use caviar::config::Config;
use caviar::domain::{IssueUpdate, PipelineRunRequest, SubmissionQuery};
use caviar::editor::MoveDirection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }
    if let Some(workers) = cli.workers {
        config.feeds.workers = workers;
    }
    let ctx = AppContext::new(config, None)?;

    match cli.command {
        Commands::Feeds { action } => match action {
            FeedsAction::List { brand } => commands::list_feeds(&ctx, brand).await?,
            FeedsAction::Add {
                brand,
                name,
                url,
                category,
            } => commands::add_feed(&ctx, brand, &name, &url, category).await?,
            FeedsAction::Toggle { id } => commands::toggle_feed(&ctx, &id).await?,
            FeedsAction::Remove { id } => commands::remove_feed(&ctx, &id).await?,
            FeedsAction::Test { ids, brand, report } => {
                commands::test_feeds(&ctx, &ids, brand, report).await?
            }
            FeedsAction::Parse { file } => commands::parse_feed_file(&ctx, &file)?,
        },
        Commands::Pipeline { action } => match action {
            PipelineAction::Status => commands::pipeline_status(&ctx).await?,
            PipelineAction::Run {
                brand,
                engine,
                source,
            } => {
                let request = PipelineRunRequest {
                    brand,
                    engine,
                    source,
                };
                commands::run_pipeline(&ctx, &request).await?
            }
        },
        Commands::Article { action } => match action {
            ArticleAction::Create {
                brand,
                title,
                content_file,
                tags,
                excerpt,
                publish,
            } => {
                let draft = ArticleDraft {
                    brand,
                    title,
                    content_file,
                    tags,
                    excerpt,
                    publish,
                };
                commands::create_article(&ctx, draft).await?
            }
        },
        Commands::Issue { action } => match action {
            IssueAction::Show { id } => commands::show_issue(&ctx, &id).await?,
            IssueAction::Update {
                id,
                title,
                description,
                cover_image,
                issue_number,
            } => {
                let update = IssueUpdate {
                    title,
                    description,
                    cover_image_url: cover_image,
                    issue_number,
                };
                commands::update_issue(&ctx, &id, &update).await?
            }
            IssueAction::Publish { id } => commands::publish_issue(&ctx, &id).await?,
            IssueAction::Check { id } => commands::check_issue(&ctx, &id).await?,
            IssueAction::Fields { page_type } => commands::page_fields(page_type),
            IssueAction::AddPage {
                id,
                page_type,
                values,
            } => commands::add_page(&ctx, &id, page_type, &values.values).await?,
            IssueAction::EditPage {
                id,
                page_id,
                values,
            } => commands::edit_page(&ctx, &id, &page_id, &values.values).await?,
            IssueAction::RemovePage { id, page_id } => {
                commands::remove_page(&ctx, &id, &page_id).await?
            }
            IssueAction::Swap {
                id,
                page_number,
                up,
                ..
            } => {
                let direction = if up {
                    MoveDirection::Up
                } else {
                    MoveDirection::Down
                };
                commands::swap_page(&ctx, &id, page_number, direction).await?
            }
        },
        Commands::Submissions { action } => match action {
            SubmissionsAction::List {
                brand,
                kind,
                status,
                per_page,
            } => {
                let query = SubmissionQuery {
                    brand,
                    kind,
                    status,
                    per_page,
                };
                commands::list_submissions(&ctx, &query).await?
            }
            SubmissionsAction::Review {
                id,
                status,
                current,
                notes,
            } => commands::review_submission(&ctx, &id, status, current, notes).await?,
        },
        Commands::Notifications { action } => match action {
            NotificationsAction::List => commands::list_notifications(&ctx).await?,
            NotificationsAction::Read { ids, all } => {
                commands::mark_notifications_read(&ctx, ids, all).await?
            }
            NotificationsAction::Watch { interval } => {
                commands::watch_notifications(&ctx, interval.as_deref()).await?
            }
        },
        Commands::Upload { files } => commands::upload_files(&ctx, &files).await?,
        Commands::Read { issue_id } => {
            let issue = ctx.editor().load(&issue_id).await?;
            caviar::tui::run(&ctx, issue)?;
        }
        Commands::Reading { action } => match action {
            ReadingAction::List => commands::list_reading(&ctx)?,
            ReadingAction::Clear { slug } => commands::clear_reading(&ctx, &slug)?,
        },
    }

    Ok(())
}
