//! Foreground notification watcher.
//!
//! Polls `GET /api/notifications` on a fixed interval and prints unread
//! notifications it has not shown before. Stops on Ctrl-C.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::time::{interval, MissedTickBehavior};

use crate::api::ApiClient;
use crate::app::Result;
use crate::domain::Notification;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
const MAX_POLL_INTERVAL_SECS: u64 = 365 * 86400;

/// Parse `"30s"`, `"5m"`, `"1h"`, `"1d"` or bare seconds.
pub fn parse_interval(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim().to_lowercase();
    let (digits, unit) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], Some(c)),
        _ => (s.as_str(), None),
    };

    let multiplier = match unit {
        None | Some('s') => 1,
        Some('m') => 60,
        Some('h') => 3600,
        Some('d') => 86400,
        Some(_) => {
            return Err(format!(
                "Invalid interval: {}. Use a form like '30s', '5m', '1h'",
                s
            ))
        }
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("Invalid interval: {}", s))?;
    if value == 0 {
        return Err("Interval must be greater than zero".to_string());
    }

    match value.checked_mul(multiplier) {
        Some(secs) if secs <= MAX_POLL_INTERVAL_SECS => Ok(Duration::from_secs(secs)),
        _ => Err(format!("Interval too large: {} (at most 365d)", s)),
    }
}

pub fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    [(86400, 'd'), (3600, 'h'), (60, 'm')]
        .into_iter()
        .find(|(unit, _)| secs >= *unit && secs % unit == 0)
        .map(|(unit, suffix)| format!("{}{}", secs / unit, suffix))
        .unwrap_or_else(|| format!("{}s", secs))
}

pub struct NotificationPoller {
    api: Arc<ApiClient>,
    interval: Duration,
    seen: HashSet<String>,
}

impl NotificationPoller {
    pub fn new(api: Arc<ApiClient>, interval: Duration) -> Self {
        Self {
            api,
            interval,
            seen: HashSet::new(),
        }
    }

    /// Fetch once and return unread notifications not returned before.
    pub async fn poll_once(&mut self) -> Result<Vec<Notification>> {
        let list = self.api.notifications().await?;
        let fresh: Vec<Notification> = list
            .unread()
            .filter(|n| !self.seen.contains(&n.id))
            .cloned()
            .collect();

        self.seen.extend(fresh.iter().map(|n| n.id.clone()));
        tracing::debug!(
            "Polled notifications: {} unread, {} new",
            list.unread_count,
            fresh.len()
        );
        Ok(fresh)
    }

    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Poll until `shutdown` resolves, even if a request is still in flight.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        println!(
            "Watching notifications every {} (Ctrl-C to stop)",
            format_interval(self.interval)
        );

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = timer.tick() => {}
            }

            let polled = tokio::select! {
                _ = &mut shutdown => break,
                polled = self.poll_once() => polled,
            };

            match polled {
                Ok(fresh) => fresh.iter().for_each(print_notification),
                Err(e) if e.is_network() => tracing::warn!("Notification poll failed: {}", e),
                Err(e) => return Err(e),
            }
        }

        println!("Stopped watching notifications");
        Ok(())
    }
}

fn print_notification(n: &Notification) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let kind = n.kind.as_deref().unwrap_or("notice");
    println!("[{}] {}: {}", timestamp, kind, n.title);
    if let Some(message) = &n.message {
        println!("    {}", message);
    }
    if let Some(link) = &n.link {
        println!("    {}", link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_interval("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_interval("1d").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_interval(" 45 ").unwrap(), Duration::from_secs(45));
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("5x").is_err());
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("").is_err());
        assert!(parse_interval("300000000000000d").is_err());
        assert!(parse_interval("18446744073709551615m").is_err());
        assert!(parse_interval("18446744073709551615").is_err());
        assert_eq!(parse_interval("365d").unwrap(), Duration::from_secs(365 * 86400));
        assert!(parse_interval("366d").is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(Duration::from_secs(30)), "30s");
        assert_eq!(format_interval(Duration::from_secs(90)), "90s");
        assert_eq!(format_interval(Duration::from_secs(300)), "5m");
        assert_eq!(format_interval(Duration::from_secs(7200)), "2h");
        assert_eq!(format_interval(Duration::from_secs(86400)), "1d");
    }

    #[test]
    fn test_poll_once_reports_each_unread_notification_once() {
        tokio_test::block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/notifications"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "notifications": [
                        {"id": "n1", "title": "New submission", "type": "submission", "read": false},
                        {"id": "n2", "title": "Pipeline finished", "read": true}
                    ],
                    "unread_count": 1
                })))
                .mount(&server)
                .await;

            let api = Arc::new(ApiClient::new(&server.uri()).unwrap());
            let mut poller = NotificationPoller::new(api, DEFAULT_POLL_INTERVAL);

            let first = poller.poll_once().await.unwrap();
            assert_eq!(first.len(), 1);
            assert_eq!(first[0].id, "n1");

            assert!(poller.poll_once().await.unwrap().is_empty());
        });
    }

    #[tokio::test]
    async fn test_poll_once_propagates_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notifications"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "Unauthorized"})))
            .mount(&server)
            .await;

        let api = Arc::new(ApiClient::new(&server.uri()).unwrap());
        let mut poller = NotificationPoller::new(api, DEFAULT_POLL_INTERVAL);

        let err = poller.poll_once().await.unwrap_err();
        assert!(!err.is_network());
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_an_in_flight_poll() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notifications"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"notifications": [], "unread_count": 0}))
                    .set_delay(Duration::from_secs(20)),
            )
            .mount(&server)
            .await;

        let api = Arc::new(ApiClient::new(&server.uri()).unwrap());
        let mut poller = NotificationPoller::new(api, DEFAULT_POLL_INTERVAL);

        let stopped = tokio::time::timeout(
            Duration::from_secs(5),
            poller.run_until(tokio::time::sleep(Duration::from_millis(200))),
        )
        .await;
        assert!(matches!(stopped, Ok(Ok(()))));
    }
}
