//! Parallel document fetching with bounded concurrency.
//!
//! [`FetchPool`] downloads every document linked from an index while
//! keeping at most `concurrency` requests in flight, using a semaphore
//! over a buffered stream. Individual failures never abort the batch;
//! they are collected and reported alongside the successes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tracing::warn;
use url::Url;

use crate::error::Result;
use crate::fetcher::IndexFetcher;
use crate::types::IndexEntry;

/// Default number of concurrent document fetches.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Filename used when a document URL has no usable path segment.
const DEFAULT_DOCUMENT_NAME: &str = "index.md";

/// Fetch phase reported through [`ProgressCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// The index document itself.
    Index,
    /// The documents linked from the index.
    Documents,
}

/// Progress callback receiving `(phase, completed, total, errors)` after
/// each completed fetch attempt.
pub type ProgressCallback = Arc<dyn Fn(FetchPhase, usize, usize, usize) + Send + Sync>;

/// Trait for fetching a single document (allows mocking in tests).
#[async_trait::async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches a document URL and returns its text content.
    async fn fetch_document(&self, url: &str) -> Result<String>;
}

#[async_trait::async_trait]
impl DocumentFetcher for IndexFetcher {
    async fn fetch_document(&self, url: &str) -> Result<String> {
        self.fetch_text(url).await
    }
}

/// A document that could not be fetched.
#[derive(Debug, Clone)]
pub struct FailedDocument {
    /// URL as written in the index entry or as resolved.
    pub url: String,
    /// Human-readable failure reason.
    pub error: String,
}

/// Aggregated results of a pool run.
#[derive(Debug, Default)]
pub struct FetchResults {
    /// Successfully fetched documents, keyed by derived filename. When two
    /// entries derive the same filename the later completion wins.
    pub documents: HashMap<String, String>,
    /// Documents that failed to resolve or fetch.
    pub failed: Vec<FailedDocument>,
    /// Total entries attempted, successes and failures together.
    pub attempted: usize,
}

/// Bounded-concurrency fetcher for a batch of index entries.
pub struct FetchPool<F: DocumentFetcher> {
    fetcher: F,
    concurrency: usize,
    progress_callback: Option<ProgressCallback>,
}

impl<F: DocumentFetcher> FetchPool<F> {
    /// Creates a pool with the given concurrency, clamped to 1-50.
    #[must_use]
    pub fn new(fetcher: F, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.clamp(1, 50),
            progress_callback: None,
        }
    }

    /// Sets a progress callback, invoked after each document attempt.
    #[must_use]
    pub fn with_progress<C>(mut self, callback: C) -> Self
    where
        C: Fn(FetchPhase, usize, usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Effective concurrency after clamping.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches every entry, resolving relative URLs against the index URL.
    ///
    /// Completion order is nondeterministic; the returned map is keyed by
    /// the filename derived from each resolved URL's last path segment.
    pub async fn fetch_all(&self, index_url: &Url, entries: &[IndexEntry]) -> FetchResults {
        if entries.is_empty() {
            return FetchResults::default();
        }

        let total = entries.len();
        let mut jobs: Vec<(String, String)> = Vec::with_capacity(total);
        let mut failed: Vec<FailedDocument> = Vec::new();

        // Resolve up front; unresolvable entries are failures that never
        // spend a request.
        for entry in entries {
            match index_url.join(&entry.url) {
                Ok(resolved) => {
                    let filename = derive_filename(&resolved);
                    jobs.push((resolved.into(), filename));
                }
                Err(e) => {
                    warn!(url = %entry.url, error = %e, "cannot resolve document URL");
                    failed.push(FailedDocument {
                        url: entry.url.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let completed = Arc::new(AtomicUsize::new(failed.len()));
        let errors = Arc::new(AtomicUsize::new(failed.len()));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        if let Some(cb) = &self.progress_callback {
            for done in 1..=failed.len() {
                cb(FetchPhase::Documents, done, total, done);
            }
        }

        let results: Vec<std::result::Result<(String, String), FailedDocument>> =
            stream::iter(jobs)
                .map(|(url, filename)| {
                    let semaphore = Arc::clone(&semaphore);
                    let completed = Arc::clone(&completed);
                    let errors = Arc::clone(&errors);
                    let progress = self.progress_callback.clone();

                    async move {
                        let _permit = semaphore.acquire().await;

                        let result = self.fetcher.fetch_document(&url).await;

                        if result.is_err() {
                            errors.fetch_add(1, Ordering::SeqCst);
                        }
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        if let Some(cb) = progress {
                            cb(FetchPhase::Documents, done, total, errors.load(Ordering::SeqCst));
                        }

                        match result {
                            Ok(content) => Ok((filename, content)),
                            Err(e) => {
                                warn!(url = %url, error = %e, "document fetch failed");
                                Err(FailedDocument {
                                    url,
                                    error: e.to_string(),
                                })
                            }
                        }
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut documents = HashMap::new();
        for result in results {
            match result {
                Ok((filename, content)) => {
                    documents.insert(filename, content);
                }
                Err(failure) => failed.push(failure),
            }
        }

        FetchResults {
            documents,
            failed,
            attempted: total,
        }
    }
}

/// Derives an on-disk filename from a resolved document URL: the last
/// non-empty path segment, or a fixed fallback for root paths.
fn derive_filename(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| {
            segments
                .rev()
                .find(|segment| !segment.is_empty())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string())
}
