use super::errors::TrackerError;
use super::types::{Board, BoardPage, IssuePage, RawIssue};
use crate::config::TrackerConfig;
use crate::observability::tracker_metrics;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::Url;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(test)]
use mockall::automock;

const SEARCH_PATH: &str = "/rest/api/2/search";
const BOARDS_PATH: &str = "/rest/agile/1.0/board";
const MAX_ATTEMPTS: u32 = 3;

/// Read-only view of the tracker used by report generation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrackerOps: Send + Sync {
    /// Run a JQL search, following pages until `limit` issues are collected
    async fn search_issues(&self, jql: &str, limit: usize) -> Result<Vec<RawIssue>, TrackerError>;
    /// Issues on an agile board; these carry the board-only `epic` field
    async fn board_issues(&self, board_id: u64, limit: usize) -> Result<Vec<RawIssue>, TrackerError>;
    async fn list_boards(&self) -> Result<Vec<Board>, TrackerError>;
}

#[derive(Clone)]
enum Credentials {
    Basic { email: String, token: String },
    Bearer(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { email, .. } => write!(f, "Basic({email}, ***)"),
            Credentials::Bearer(_) => write!(f, "Bearer(***)"),
        }
    }
}

/// Rate-limited, caching REST client for the issue tracker
#[derive(Debug)]
pub struct TrackerClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    cache: Cache<String, serde_json::Value>,
    page_size: usize,
}

impl TrackerClient {
    pub fn new(config: &TrackerConfig) -> Result<Self, TrackerError> {
        if config.base_url.trim().is_empty() {
            return Err(TrackerError::ConfigNotFound(
                "Tracker base URL is not set".to_string(),
            ));
        }
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                TrackerError::TokenNotFound(
                    "No API token found in configuration or environment".to_string(),
                )
            })?;
        let credentials = match config.email.clone().filter(|e| !e.trim().is_empty()) {
            Some(email) => Credentials::Basic { email, token },
            None => Credentials::Bearer(token),
        };

        let per_second = NonZeroU32::new(config.rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.rate_limit.burst_capacity).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst)));

        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .build();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("tracker-pulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            rate_limiter,
            cache,
            page_size: config.page_size.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
        info!("Tracker response cache cleared");
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, TrackerError> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params).map_err(|e| {
            TrackerError::ConfigNotFound(format!("Invalid tracker URL '{}': {e}", self.base_url))
        })
    }

    /// GET a JSON document with caching, rate limiting and bounded retry
    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<serde_json::Value, TrackerError> {
        let url = self.url(path, params)?;
        let cache_key = url.to_string();
        let metrics = tracker_metrics();

        if let Some(cached) = self.cache.get(&cache_key).await {
            metrics.record_cache_hit();
            debug!("Cache hit for {}", cache_key);
            return Ok(cached);
        }
        metrics.record_cache_miss();

        let mut attempts = 0;
        loop {
            attempts += 1;
            // check() takes a cell on success; only wait when it was refused
            if self.rate_limiter.check().is_err() {
                metrics.record_rate_limit_wait();
                self.rate_limiter
                    .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
                    .await;
            }

            metrics.record_request();
            match self.send(url.clone()).await {
                Ok(value) => {
                    self.cache.insert(cache_key, value.clone()).await;
                    return Ok(value);
                }
                Err(e) if attempts < MAX_ATTEMPTS && e.is_retryable() => {
                    metrics.record_error();
                    warn!("Tracker request failed (attempt {}): {:?}", attempts, e);
                    tokio::time::sleep(Duration::from_millis(500 * attempts as u64)).await;
                }
                Err(e) => {
                    metrics.record_error();
                    return Err(e);
                }
            }
        }
    }

    async fn send(&self, url: Url) -> Result<serde_json::Value, TrackerError> {
        let request = self.http.get(url).header("Accept", "application/json");
        let request = match &self.credentials {
            Credentials::Basic { email, token } => request.basic_auth(email, Some(token)),
            Credentials::Bearer(token) => request.bearer_auth(token),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Api {
                status: status.as_u16(),
                message: api_error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string()),
            });
        }
        Ok(response.json::<serde_json::Value>().await?)
    }

    async fn paginate(
        &self,
        path: &str,
        params: &[(&str, String)],
        limit: usize,
    ) -> Result<Vec<RawIssue>, TrackerError> {
        let mut issues: Vec<RawIssue> = Vec::new();
        let mut start_at = 0usize;

        while issues.len() < limit {
            let page_size = self.page_size.min(limit - issues.len());
            let mut page_params = params.to_vec();
            page_params.push(("startAt", start_at.to_string()));
            page_params.push(("maxResults", page_size.to_string()));

            let page: IssuePage = serde_json::from_value(self.get_json(path, &page_params).await?)?;
            let fetched = page.issues.len();
            debug!(path, start_at, fetched, total = page.total, "Fetched issue page");
            issues.extend(page.issues);
            start_at += fetched;

            if is_last_page(fetched, page_size, start_at, page.total) {
                break;
            }
        }

        issues.truncate(limit);
        Ok(issues)
    }
}

fn is_last_page(fetched: usize, requested: usize, start_at: usize, total: u64) -> bool {
    fetched == 0 || fetched < requested || (total > 0 && start_at as u64 >= total)
}

/// Pull the human-readable part out of a tracker error body
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let messages: Vec<String> = value
        .get("errorMessages")
        .and_then(|m| m.as_array())
        .map(|m| m.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();
    if messages.is_empty() {
        value.get("message").and_then(|m| m.as_str()).map(String::from)
    } else {
        Some(messages.join("; "))
    }
}

#[async_trait]
impl TrackerOps for TrackerClient {
    async fn search_issues(&self, jql: &str, limit: usize) -> Result<Vec<RawIssue>, TrackerError> {
        let params = [("jql", jql.to_string()), ("fields", "*all".to_string())];
        self.paginate(SEARCH_PATH, &params, limit).await
    }

    async fn board_issues(&self, board_id: u64, limit: usize) -> Result<Vec<RawIssue>, TrackerError> {
        let path = format!("{BOARDS_PATH}/{board_id}/issue");
        self.paginate(&path, &[], limit).await
    }

    async fn list_boards(&self) -> Result<Vec<Board>, TrackerError> {
        let mut boards = Vec::new();
        let mut start_at = 0usize;
        loop {
            let params = [("startAt", start_at.to_string())];
            let page: BoardPage = serde_json::from_value(self.get_json(BOARDS_PATH, &params).await?)?;
            let fetched = page.values.len();
            boards.extend(page.values);
            start_at += fetched;
            if page.is_last || fetched == 0 {
                break;
            }
        }
        Ok(boards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerPulseConfig;

    fn tracker_config() -> TrackerConfig {
        let mut config = TrackerPulseConfig::default().tracker;
        config.base_url = "https://tracker.example.com/".to_string();
        config.token = Some("secret".to_string());
        config
    }

    #[test]
    fn test_client_requires_token_and_base_url() {
        let mut config = tracker_config();
        config.token = None;
        assert!(matches!(TrackerClient::new(&config), Err(TrackerError::TokenNotFound(_))));

        let mut config = tracker_config();
        config.base_url = String::new();
        assert!(matches!(TrackerClient::new(&config), Err(TrackerError::ConfigNotFound(_))));
    }

    #[test]
    fn test_url_building_encodes_jql() {
        let client = TrackerClient::new(&tracker_config()).unwrap();
        assert_eq!(client.base_url(), "https://tracker.example.com");

        let url = client
            .url(SEARCH_PATH, &[("jql", "project = \"APP\"".to_string())])
            .unwrap();
        assert_eq!(url.path(), "/rest/api/2/search");
        assert_eq!(
            url.query_pairs().next().map(|(k, v)| (k.into_owned(), v.into_owned())),
            Some(("jql".to_string(), "project = \"APP\"".to_string()))
        );
    }

    #[test]
    fn test_last_page_detection() {
        assert!(is_last_page(0, 50, 0, 0));
        assert!(is_last_page(20, 50, 20, 0));
        assert!(is_last_page(50, 50, 100, 100));
        assert!(!is_last_page(50, 50, 50, 120));
    }

    #[test]
    fn test_api_error_message_extraction() {
        assert_eq!(
            api_error_message(r#"{"errorMessages": ["Field 'foo' does not exist", "Bad JQL"]}"#),
            Some("Field 'foo' does not exist; Bad JQL".to_string())
        );
        assert_eq!(
            api_error_message(r#"{"message": "Board not found"}"#),
            Some("Board not found".to_string())
        );
        assert_eq!(api_error_message("<html>oops</html>"), None);
    }

    #[test]
    fn test_debug_output_hides_token() {
        let mut config = tracker_config();
        config.email = Some("dev@acme.io".to_string());
        let client = TrackerClient::new(&config).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("dev@acme.io"));
        assert!(!debug.contains("secret"));
    }

    #[tokio::test]
    async fn test_cache_clear_is_safe_on_empty_cache() {
        let client = TrackerClient::new(&tracker_config()).unwrap();
        client.clear_cache();
        assert!(client.cache.get("missing").await.is_none());
    }
}
