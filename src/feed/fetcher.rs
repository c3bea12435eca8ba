use crate::feed::parser::{parse_feed, VideoRecord};
use futures::stream::StreamExt;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Rows requested per page. A page holding this many records is taken to mean
/// that another page may follow.
pub const PAGE_SIZE: usize = 50;

/// Archive service answering collection searches with an RSS document.
pub const DEFAULT_ENDPOINT: &str = "https://archive.org/services/collection-rss.php";

/// Collection browsed when none is configured.
pub const DEFAULT_COLLECTION: &str = "giant-bomb-archive";

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching a page of the collection feed.
///
/// Feed content problems are not represented here: the parser degrades
/// instead of failing.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// The fetch task died before reporting a result
    #[error("Fetch interrupted: {0}")]
    Interrupted(String),
}

/// Create a redirect policy with loop detection and limited hops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 5 {
            return attempt.error("Too many redirects (max 5)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Build the shared HTTP client used for feed requests.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
}

/// Client for one archive collection's paginated search feed.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    http: reqwest::Client,
    endpoint: Url,
    collection: String,
    timeout: Option<Duration>,
}

impl ArchiveClient {
    pub fn new(http: reqwest::Client, endpoint: Url, collection: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            collection: collection.into(),
            timeout: None,
        }
    }

    /// Bound each page fetch (request and body) by `timeout`. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Search URL for `page` (1-based).
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("collection:\"{}\"", self.collection))
            .append_pair("fl[]", "identifier")
            .append_pair("rows", &PAGE_SIZE.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("output", "rss")
            .append_pair("save", "yes");
        url
    }

    /// Fetches `page` and parses it into records.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] - Connection, TLS or body read errors
    /// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
    /// - [`FetchError::Timeout`] - The configured timeout elapsed
    /// - [`FetchError::ResponseTooLarge`] - Response exceeded 10MB
    ///
    /// A body that is not a usable feed is not an error; it yields an empty page.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<VideoRecord>, FetchError> {
        let text = self.fetch_page_text(page).await?;
        let records = parse_feed(&text);
        tracing::info!(
            collection = %self.collection,
            page,
            records = records.len(),
            "Fetched archive page"
        );
        Ok(records)
    }

    /// Fetches the raw feed text for `page`.
    pub async fn fetch_page_text(&self, page: u32) -> Result<String, FetchError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.request(page))
                .await
                .map_err(|_| FetchError::Timeout(limit))?,
            None => self.request(page).await,
        }
    }

    async fn request(&self, page: u32) -> Result<String, FetchError> {
        let url = self.page_url(page);
        tracing::debug!(url = %url, page, "Requesting archive page");

        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            tracing::warn!(page, status = %response.status(), "Archive page request failed");
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
