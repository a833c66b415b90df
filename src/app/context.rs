use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ApiClient, MagazineApi};
use crate::app::error::{CaviarError, Result};
use crate::config::Config;
use crate::editor::MagazineEditor;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::FeedTester;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::reader::ReadingPositions;
use crate::store::sqlite::SqliteStore;
use crate::store::Store;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub api: Arc<ApiClient>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub feed_tester: FeedTester,
    pub parser: FeedParser,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        Self::build(config, Arc::new(SqliteStore::new(&db_path)?))
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        Self::build(config, Arc::new(SqliteStore::in_memory()?))
    }

    fn build(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let api = Arc::new(ApiClient::with_timeout(
            &config.api.base_url,
            config.api.timeout(),
        )?);

        let feeds = &config.feeds;
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::with_timeout(feeds.fetch_timeout()));
        let parser = FeedParser::with_limits(feeds.max_entries, feeds.description_limit);
        let feed_tester = FeedTester::with_workers(fetcher.clone(), parser.clone(), feeds.workers);

        Ok(Self {
            config,
            store,
            api,
            fetcher,
            feed_tester,
            parser,
        })
    }

    pub fn positions(&self) -> ReadingPositions {
        let store: Arc<dyn Store + Send + Sync> = self.store.clone();
        ReadingPositions::new(store)
    }

    pub fn editor(&self) -> MagazineEditor {
        let api: Arc<dyn MagazineApi> = self.api.clone();
        MagazineEditor::new(api)
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CaviarError::Config("Could not find data directory".into()))?;
        let caviar_dir = data_dir.join("caviar");
        std::fs::create_dir_all(&caviar_dir)?;
        Ok(caviar_dir.join("caviar.db"))
    }
}
