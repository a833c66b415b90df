pub mod http_fetcher;
pub mod parallel;

use async_trait::async_trait;

use crate::app::Result;

#[async_trait]
pub trait Fetcher {
    /// Fetch a feed body. Non-2xx responses and timeouts are errors.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
