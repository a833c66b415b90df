use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::api::MagazineApi;
use crate::app::{CaviarError, Result};
use crate::domain::{
    Article, Brand, IssueUpdate, MagazineIssue, MagazinePage, MarkRead, NewArticle, NewRssFeed,
    NotificationList, PipelineRunRequest, PipelineStatus, RssFeed, RssFeedUpdate, RunResult,
    Submission, SubmissionQuery, SubmissionReview,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One page of `GET /api/submissions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionPage {
    pub submissions: Vec<Submission>,
    pub total: Option<u64>,
}

pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(CaviarError::Config(format!(
                "API base URL cannot carry paths: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("caviar/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CaviarError::Config(format!("Invalid API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.request(method, self.endpoint(segments)?))
    }

    async fn send_json(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    // Articles

    pub async fn create_article(&self, article: &NewArticle) -> Result<Article> {
        let req = self.request(Method::POST, &["api", "articles"])?.json(article);
        let value = self.send_json(req).await?;
        tracing::info!("Created article {}", article.slug);
        unwrap_envelope(value, "article")
    }

    // AI pipeline

    pub async fn pipeline_status(&self) -> Result<PipelineStatus> {
        let req = self.request(Method::GET, &["api", "ai-pipeline"])?;
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "status")
    }

    pub async fn run_pipeline(&self, request: &PipelineRunRequest) -> Result<Vec<RunResult>> {
        let req = self
            .request(Method::POST, &["api", "ai-pipeline"])?
            .json(request);
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "results")
    }

    // RSS feeds

    pub async fn list_feeds(&self, brand: Option<Brand>) -> Result<Vec<RssFeed>> {
        let mut req = self.request(Method::GET, &["api", "rss-feeds"])?;
        if let Some(brand) = brand {
            req = req.query(&[("brand", brand.as_str())]);
        }
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "feeds")
    }

    pub async fn create_feed(&self, feed: &NewRssFeed) -> Result<RssFeed> {
        let req = self.request(Method::POST, &["api", "rss-feeds"])?.json(feed);
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "feed")
    }

    pub async fn update_feed(&self, feed_id: &str, update: &RssFeedUpdate) -> Result<RssFeed> {
        let req = self
            .request(Method::PATCH, &["api", "rss-feeds", feed_id])?
            .json(update);
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "feed")
    }

    pub async fn delete_feed(&self, feed_id: &str) -> Result<()> {
        let req = self.request(Method::DELETE, &["api", "rss-feeds", feed_id])?;
        self.send_json(req).await?;
        Ok(())
    }

    // Submissions

    pub async fn list_submissions(&self, query: &SubmissionQuery) -> Result<SubmissionPage> {
        let req = self
            .request(Method::GET, &["api", "submissions"])?
            .query(&query.to_pairs());
        let value = self.send_json(req).await?;

        if value.is_array() {
            return Ok(SubmissionPage {
                submissions: serde_json::from_value(value)?,
                total: None,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub async fn review_submission(
        &self,
        submission_id: &str,
        review: &SubmissionReview,
    ) -> Result<Submission> {
        let req = self
            .request(Method::PATCH, &["api", "submissions", submission_id, "review"])?
            .json(review);
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "submission")
    }

    // Notifications

    pub async fn notifications(&self) -> Result<NotificationList> {
        let req = self.request(Method::GET, &["api", "notifications"])?;
        let value = self.send_json(req).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn mark_notifications_read(&self, mark: &MarkRead) -> Result<()> {
        let req = self
            .request(Method::PATCH, &["api", "notifications"])?
            .json(mark);
        self.send_json(req).await?;
        Ok(())
    }

    // Uploads

    /// Upload one file as multipart field `file`; returns its public URL.
    pub async fn upload(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(path))?;
        let form = Form::new().part("file", part);

        let req = self
            .request(Method::POST, &["api", "upload"])?
            .multipart(form);
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "url")
    }

    /// Upload files one after another. Each file gets its own result; a failed
    /// upload does not stop the ones after it.
    pub async fn upload_many(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<String>)> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = self.upload(path).await;
            if let Err(e) = &result {
                tracing::warn!("Upload of {} failed: {}", path.display(), e);
            }
            results.push((path.clone(), result));
        }
        results
    }
}

#[async_trait]
impl MagazineApi for ApiClient {
    async fn get_issue(&self, issue_id: &str) -> Result<MagazineIssue> {
        let req = self.request(Method::GET, &["api", "magazine-issues", issue_id])?;
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "issue")
    }

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> Result<MagazineIssue> {
        let req = self
            .request(Method::PATCH, &["api", "magazine-issues", issue_id])?
            .json(update);
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "issue")
    }

    async fn publish_issue(&self, issue_id: &str) -> Result<MagazineIssue> {
        let req = self.request(
            Method::POST,
            &["api", "magazine-issues", issue_id, "publish"],
        )?;
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "issue")
    }

    async fn create_page(&self, issue_id: &str, body: &Map<String, Value>) -> Result<MagazinePage> {
        let req = self
            .request(Method::POST, &["api", "magazine-issues", issue_id, "pages"])?
            .json(body);
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "page")
    }

    async fn update_page(
        &self,
        issue_id: &str,
        page_id: &str,
        body: &Map<String, Value>,
    ) -> Result<MagazinePage> {
        let req = self
            .request(
                Method::PATCH,
                &["api", "magazine-issues", issue_id, "pages", page_id],
            )?
            .json(body);
        let value = self.send_json(req).await?;
        unwrap_envelope(value, "page")
    }

    async fn delete_page(&self, issue_id: &str, page_id: &str) -> Result<()> {
        let req = self.request(
            Method::DELETE,
            &["api", "magazine-issues", issue_id, "pages", page_id],
        )?;
        self.send_json(req).await?;
        Ok(())
    }
}

fn api_error(status: StatusCode, body: &str) -> CaviarError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.to_string()
            }
        });

    CaviarError::Api {
        status: status.as_u16(),
        message,
    }
}

fn unwrap_envelope<T: DeserializeOwned>(value: Value, key: &str) -> Result<T> {
    let inner = match value {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Engine, SourceMode, SubmissionStatus};
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri()).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new("https://admin.example.com/dashboard/").unwrap();
        let url = client.endpoint(&["api", "rss-feeds", "f 1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://admin.example.com/dashboard/api/rss-feeds/f%201"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(ApiClient::new("mailto:editor@example.com").is_err());
        assert!(ApiClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_validation_error_surfaces_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "title is required" })))
            .mount(&server)
            .await;

        let article = NewArticle::new(Brand::SauceWire, "", "body");
        let err = client(&server).await.create_article(&article).await.unwrap_err();
        match err {
            CaviarError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "title is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_article_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "article": {
                    "id": "a1", "brand": "saucecaviar", "slug": "cover-story",
                    "title": "Cover Story", "status": "draft", "tags": ["cover"]
                }
            })))
            .mount(&server)
            .await;

        let article = NewArticle::new(Brand::SauceCaviar, "Cover Story", "body");
        let created = client(&server).await.create_article(&article).await.unwrap();
        assert_eq!(created.id, "a1");
        assert_eq!(created.tags, vec!["cover"]);
    }

    #[tokio::test]
    async fn test_run_pipeline_posts_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai-pipeline"))
            .and(body_json(json!({ "brand": "trapglow", "engine": "openai", "source": "rss" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "status": "no_results", "brand": "trapglow" }]
            })))
            .mount(&server)
            .await;

        let request = PipelineRunRequest {
            brand: Some(Brand::TrapGlow),
            engine: Engine::OpenAi,
            source: SourceMode::Rss,
        };
        let results = client(&server).await.run_pipeline(&request).await.unwrap();
        assert_eq!(results, vec![RunResult::NoResults { brand: Brand::TrapGlow }]);
    }

    #[tokio::test]
    async fn test_list_feeds_accepts_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/rss-feeds"))
            .and(query_param("brand", "saucewire"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "f1", "brand": "saucewire", "url": "https://example.com/rss", "enabled": false }
            ])))
            .mount(&server)
            .await;

        let feeds = client(&server)
            .await
            .list_feeds(Some(Brand::SauceWire))
            .await
            .unwrap();
        assert_eq!(feeds.len(), 1);
        assert!(!feeds[0].enabled);
    }

    #[tokio::test]
    async fn test_list_submissions_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/submissions"))
            .and(query_param("brand", "trapglow"))
            .and(query_param("type", "artist"))
            .and(query_param("status", "pending"))
            .and(query_param("per_page", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "submissions": [{
                    "id": "s1", "brand": "trapglow", "type": "artist",
                    "status": "pending", "name": "Lil Example"
                }],
                "total": 1
            })))
            .mount(&server)
            .await;

        let query = SubmissionQuery {
            brand: Some(Brand::TrapGlow),
            kind: Some("artist".into()),
            status: Some(SubmissionStatus::Pending),
            per_page: Some(10),
        };
        let page = client(&server).await.list_submissions(&query).await.unwrap();
        assert_eq!(page.total, Some(1));
        assert_eq!(page.submissions[0].display_title(), "Lil Example");
    }

    #[tokio::test]
    async fn test_publish_issue() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/magazine-issues/i1/publish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issue": { "id": "i1", "slug": "issue-1", "title": "Issue 1", "status": "published" }
            })))
            .mount(&server)
            .await;

        let issue = client(&server).await.publish_issue("i1").await.unwrap();
        assert_eq!(issue.status, crate::domain::IssueStatus::Published);
        assert!(issue.pages.is_empty());
    }

    #[tokio::test]
    async fn test_delete_page_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/magazine-issues/i1/pages/p9"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client(&server).await.delete_page("i1", "p9").await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_many_continues_after_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "url": "https://cdn.example.com/a.jpg" })),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.jpg");
        std::fs::File::create(&good)
            .unwrap()
            .write_all(b"\xff\xd8\xff")
            .unwrap();
        let missing = dir.path().join("missing.png");

        let results = client(&server)
            .await
            .upload_many(&[missing.clone(), good.clone()])
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, missing);
        assert!(matches!(results[0].1, Err(CaviarError::Io(_))));
        assert_eq!(results[1].1.as_deref().unwrap(), "https://cdn.example.com/a.jpg");
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for(Path::new("cover.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_for(Path::new("notes")), "application/octet-stream");
    }
}
