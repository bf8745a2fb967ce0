//! HTTP acquisition of llms.txt indexes and linked documents.
//!
//! [`IndexFetcher`] probes a documentation base URL for an index file,
//! trying `llms.txt` then `llms-full.txt` at the given path and, when both
//! miss and the base URL has a non-root path, the same candidates at the
//! host root. Root-fallback hits carry the original path back to the
//! caller as a prefix so unrelated entries can be filtered out.
//!
//! Transient failures (connection errors and 5xx responses) are retried
//! with exponential backoff; 4xx responses are definitive misses.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Error, Result};

/// Index filenames probed at each location, in preference order.
const INDEX_CANDIDATES: [&str; 2] = ["llms.txt", "llms-full.txt"];

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry behavior for transient fetch failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per URL, the first try included.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given zero-based attempt.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powf(f64::from(attempt));
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

/// A successfully retrieved index document.
#[derive(Debug, Clone)]
pub struct FetchedIndex {
    /// Exact URL the index was retrieved from.
    pub url: String,
    /// Raw index text.
    pub text: String,
    /// Original base path when the index was found at the host root
    /// instead of the requested path. Entries outside this prefix do not
    /// belong to the requested documentation set.
    pub path_prefix: Option<String>,
}

/// HTTP client for index and document retrieval.
#[derive(Debug, Clone)]
pub struct IndexFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl IndexFetcher {
    /// Creates a fetcher with the default timeout and retry policy.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a fetcher with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("erudita/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            client,
            policy: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Locates and retrieves the llms.txt index for a documentation base
    /// URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] when the base is not an http(s) URL
    /// and [`Error::IndexNotFound`] when every candidate location misses.
    #[instrument(skip(self))]
    pub async fn fetch_index(&self, base_url: &str) -> Result<FetchedIndex> {
        let trimmed = base_url.trim();
        let parsed =
            Url::parse(trimmed).map_err(|_| Error::InvalidUrl(base_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(base_url.to_string()));
        }

        let base = trimmed.trim_end_matches('/');
        for name in INDEX_CANDIDATES {
            let candidate = format!("{base}/{name}");
            if let Some(text) = self.try_candidate(&candidate).await {
                return Ok(FetchedIndex {
                    url: candidate,
                    text,
                    path_prefix: None,
                });
            }
        }

        // A docs site may only publish an index at its root. Remember the
        // original path so the caller can filter entries down to it.
        let path = parsed.path().trim_end_matches('/');
        if !path.is_empty() {
            let root = host_root(&parsed);
            for name in INDEX_CANDIDATES {
                let candidate = format!("{root}/{name}");
                if let Some(text) = self.try_candidate(&candidate).await {
                    debug!(prefix = path, url = %candidate, "index found at host root");
                    return Ok(FetchedIndex {
                        url: candidate,
                        text,
                        path_prefix: Some(path.to_string()),
                    });
                }
            }
        }

        Err(Error::IndexNotFound(base_url.to_string()))
    }

    /// Retrieves a URL as text, retrying transient failures per the
    /// configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for definitive HTTP misses and
    /// [`Error::Network`] when retries are exhausted on transport errors.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.policy.delay_for(attempt - 1)).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => return Ok(body),
                            Err(e) => {
                                debug!(url, attempt, error = %e, "failed reading response body");
                                last_err = Some(Error::Network(e));
                            }
                        }
                    } else if status.is_server_error() {
                        debug!(url, attempt, %status, "server error");
                        last_err = Some(Error::NotFound(format!("{url} returned {status}")));
                    } else {
                        return Err(Error::NotFound(format!("{url} returned {status}")));
                    }
                }
                Err(e) => {
                    if e.is_builder() {
                        return Err(Error::InvalidUrl(url.to_string()));
                    }
                    debug!(url, attempt, error = %e, "request failed");
                    last_err = Some(Error::Network(e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::NotFound(format!("{url} could not be fetched"))))
    }

    async fn try_candidate(&self, url: &str) -> Option<String> {
        match self.fetch_text(url).await {
            Ok(body) if looks_like_index(&body) => Some(body),
            Ok(_) => {
                debug!(url, "response has no markdown heading, not an index");
                None
            }
            Err(e) => {
                debug!(url, error = %e, "candidate miss");
                None
            }
        }
    }
}

fn host_root(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}

/// Sanity check that a response body is markdown-like rather than an
/// HTML error page or a captive-portal response: at least one line must
/// be a markdown heading.
fn looks_like_index(body: &str) -> bool {
    body.lines().any(|line| {
        let trimmed = line.trim_start();
        let hashes = trimmed.chars().take_while(|&c| c == '#').count();
        (1..=6).contains(&hashes) && trimmed.chars().nth(hashes) == Some(' ')
    })
}
