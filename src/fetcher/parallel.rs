use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use crate::app::{CaviarError, Result};
use crate::domain::{FeedEntry, RssFeed, RssFeedUpdate};
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;

pub const DEFAULT_WORKERS: usize = 10;

/// Result of testing one feed. A failure never aborts the rest of the batch.
#[derive(Debug)]
pub struct FeedTestOutcome {
    pub feed: RssFeed,
    pub checked_at: DateTime<Utc>,
    pub result: Result<Vec<FeedEntry>>,
}

impl FeedTestOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// PATCH body recording this outcome on the feed.
    ///
    /// Success stamps `last_fetched_at` and clears `fetch_error`; failure only
    /// records the error string.
    pub fn to_update(&self) -> RssFeedUpdate {
        match &self.result {
            Ok(_) => RssFeedUpdate {
                last_fetched_at: Some(self.checked_at),
                fetch_error: Some(None),
                ..Default::default()
            },
            Err(e) => RssFeedUpdate {
                fetch_error: Some(Some(e.to_string())),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeedTestSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub entries: usize,
    pub distinct_entries: usize,
}

impl FeedTestSummary {
    pub fn from_outcomes(outcomes: &[FeedTestOutcome]) -> Self {
        let mut summary = Self::default();
        let mut seen = HashSet::new();

        for outcome in outcomes {
            match &outcome.result {
                Ok(entries) => {
                    summary.succeeded += 1;
                    summary.entries += entries.len();
                    for entry in entries.iter().filter(|e| !e.url.is_empty()) {
                        seen.insert(entry.fingerprint());
                    }
                }
                Err(_) => summary.failed += 1,
            }
        }

        summary.distinct_entries = seen.len();
        summary
    }
}

pub struct FeedTester {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    parser: FeedParser,
    semaphore: Arc<Semaphore>,
}

impl FeedTester {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, parser: FeedParser) -> Self {
        Self::with_workers(fetcher, parser, DEFAULT_WORKERS)
    }

    pub fn with_workers(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        parser: FeedParser,
        workers: usize,
    ) -> Self {
        Self {
            fetcher,
            parser,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Test every feed concurrently, bounded by the worker count.
    ///
    /// Outcomes come back in input order.
    pub async fn test_all(&self, feeds: Vec<RssFeed>) -> Vec<FeedTestOutcome> {
        let mut handles = Vec::new();

        for feed in feeds {
            let feed_for_task = feed.clone();
            let fetcher = self.fetcher.clone();
            let parser = self.parser.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let feed = feed_for_task;
                let _permit = semaphore.acquire().await.expect("Semaphore closed");

                let result = test_single_feed(&fetcher, &parser, &feed.url).await;
                if let Err(e) = &result {
                    tracing::warn!("Feed {} failed: {}", feed.url, e);
                }
                FeedTestOutcome {
                    feed,
                    checked_at: Utc::now(),
                    result,
                }
            });

            handles.push((feed, handle));
        }

        let mut outcomes = Vec::new();
        for (feed, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("Task join error for {}: {}", feed.url, e);
                    outcomes.push(FeedTestOutcome {
                        feed,
                        checked_at: Utc::now(),
                        result: Err(CaviarError::Other(format!("Feed test aborted: {}", e))),
                    });
                }
            }
        }

        outcomes
    }
}

async fn test_single_feed(
    fetcher: &Arc<dyn Fetcher + Send + Sync>,
    parser: &FeedParser,
    url: &str,
) -> Result<Vec<FeedEntry>> {
    let body = fetcher.fetch(url).await?;
    let entries = parser.parse_bytes(&body);
    tracing::info!("Extracted {} entries from {}", entries.len(), url);
    Ok(entries)
}
