use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{CaviarError, Result};
use crate::fetcher::Fetcher;

/// Feed tests give up after this long.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("caviar/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching feed {}", url);

        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "application/rss+xml, application/atom+xml, application/xml, text/xml, */*",
            )
            .send()
            .await
            .map_err(|e| map_send_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaviarError::FeedFetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_send_error(url, e))?;
        Ok(body.to_vec())
    }
}

fn map_send_error(url: &str, err: reqwest::Error) -> CaviarError {
    if err.is_timeout() {
        CaviarError::Timeout(url.to_string())
    } else {
        CaviarError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss></rss>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new();
        let body = fetcher
            .fetch(&format!("{}/feed.xml", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"<rss></rss>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_feed_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/missing.xml", server.uri());
        let err = HttpFetcher::new().fetch(&url).await.unwrap_err();
        assert!(matches!(err, CaviarError::FeedFetch { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_slow_feed_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<rss></rss>")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::with_timeout(Duration::from_millis(50));
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, CaviarError::Timeout(_)));
    }
}
