//! End-to-end acquisition pipeline.
//!
//! [`Pipeline`] glues the stages together behind one call: resolve the
//! documentation origin through the registry (unless the caller already
//! knows it), locate and fetch the llms.txt index, parse it, download
//! every linked document with bounded concurrency, and replace the cache
//! entry. The CLI and the MCP server both drive this type, so their
//! behavior never drifts apart.

use tracing::{info, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::IndexFetcher;
use crate::parser;
use crate::pool::{FetchPhase, FetchPool, ProgressCallback};
use crate::registry::RegistryClient;
use crate::storage::DocStore;
use crate::types::PackageKey;

/// Summary of one completed cache run.
#[derive(Debug, Clone)]
pub struct CacheReport {
    /// Package the run was for.
    pub key: PackageKey,
    /// Origin base URL the documentation came from.
    pub origin: String,
    /// Exact URL the index was retrieved from.
    pub index_url: String,
    /// Documents fetched and cached.
    pub documents: usize,
    /// Documents that failed to fetch.
    pub failures: usize,
}

/// Shared resolve-fetch-parse-store pipeline.
pub struct Pipeline {
    registry: RegistryClient,
    fetcher: IndexFetcher,
    store: DocStore,
    concurrency: usize,
}

impl Pipeline {
    /// Builds a pipeline from resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            registry: RegistryClient::with_base_url(&config.registry_url)?,
            fetcher: IndexFetcher::new()?,
            store: DocStore::new(&config.cache_root)?,
            concurrency: config.concurrency,
        })
    }

    /// Builds a pipeline from explicit parts (allows injecting fakes in
    /// tests).
    #[must_use]
    pub const fn new(
        registry: RegistryClient,
        fetcher: IndexFetcher,
        store: DocStore,
        concurrency: usize,
    ) -> Self {
        Self {
            registry,
            fetcher,
            store,
            concurrency,
        }
    }

    /// The underlying documentation store.
    #[must_use]
    pub const fn store(&self) -> &DocStore {
        &self.store
    }

    /// Resolves a package's documentation origin through the registry.
    pub async fn resolve_origin(&self, key: &PackageKey) -> Option<String> {
        self.registry.resolve_origin(key).await
    }

    /// Resolves the origin, then fetches and caches the documentation.
    #[instrument(skip_all, fields(package = %key))]
    pub async fn cache_package(
        &self,
        key: &PackageKey,
        progress: Option<ProgressCallback>,
    ) -> Result<CacheReport> {
        let origin = self
            .registry
            .resolve_origin(key)
            .await
            .ok_or_else(|| Error::OriginNotFound(key.to_string()))?;
        self.cache_package_from(key, &origin, progress).await
    }

    /// Fetches and caches documentation from an already-known origin,
    /// skipping registry resolution.
    #[instrument(skip_all, fields(package = %key, origin = %origin))]
    pub async fn cache_package_from(
        &self,
        key: &PackageKey,
        origin: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<CacheReport> {
        let fetched = self.fetcher.fetch_index(origin).await?;
        if let Some(cb) = &progress {
            cb(FetchPhase::Index, 1, 1, 0);
        }

        let document = parser::parse_index(&fetched.text);
        if document.is_empty() {
            return Err(Error::IndexInvalid(format!(
                "document at {} has no title, description, or entries",
                fetched.url
            )));
        }

        let index_url =
            Url::parse(&fetched.url).map_err(|_| Error::InvalidUrl(fetched.url.clone()))?;
        let entries = match &fetched.path_prefix {
            Some(prefix) => {
                let kept = parser::filter_by_prefix(document.entries, &index_url, prefix);
                if kept.is_empty() {
                    return Err(Error::IndexInvalid(format!(
                        "no entries at {} match the path prefix '{prefix}'",
                        fetched.url
                    )));
                }
                kept
            }
            None => document.entries,
        };

        let mut pool = FetchPool::new(self.fetcher.clone(), self.concurrency);
        if let Some(cb) = progress {
            pool = pool.with_progress(move |phase, done, total, errors| {
                cb(phase, done, total, errors);
            });
        }
        let results = pool.fetch_all(&index_url, &entries).await;

        self.store
            .cache(key, origin, &fetched.text, &results.documents)?;

        info!(
            package = %key,
            origin,
            documents = results.documents.len(),
            failed = results.failed.len(),
            "cached package documentation"
        );

        Ok(CacheReport {
            key: key.clone(),
            origin: origin.to_string(),
            index_url: fetched.url,
            documents: results.documents.len(),
            failures: results.failed.len(),
        })
    }
}
