//! # erudita-core
//!
//! Core functionality for erudita - a local documentation cache built on the
//! llms.txt convention.
//!
//! This crate resolves npm package names to documentation sites, discovers
//! and parses their llms.txt indexes, downloads the linked documents with
//! bounded concurrency, and stores everything in a per-package cache that
//! survives offline. The CLI and the MCP server are thin front ends over
//! the same [`Pipeline`].
//!
//! ## Architecture
//!
//! The crate is organized around several key components:
//!
//! - **Resolution**: npm registry lookups mapping package names to
//!   documentation origins
//! - **Acquisition**: llms.txt discovery with root fallback, retrying
//!   fetches, and a concurrency-bounded document pool
//! - **Parsing**: line-oriented llms.txt parsing into structured entries
//! - **Storage**: atomic per-package cache entries with percent-encoded
//!   directory names
//! - **Projects**: `erudita.json` manifests and `.erudita` link directories
//!   for per-project installs
//!
//! ## Quick Start
//!
//! ```rust
//! use erudita_core::{parser, PackageKey};
//!
//! // Parse a package spec
//! let key = PackageKey::parse("@types/node@20.1.0")?;
//! assert_eq!(key.name, "@types/node");
//! assert_eq!(key.version.as_deref(), Some("20.1.0"));
//!
//! // Parse an llms.txt index
//! let index = parser::parse_index("# Node\n\n> Node.js docs.\n\n- [API](/docs/api.md)\n");
//! assert_eq!(index.title, "Node");
//! assert_eq!(index.entries.len(), 1);
//! # Ok::<(), erudita_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`] with structured
//! error information:
//!
//! ```rust
//! use erudita_core::{Error, PackageKey};
//!
//! match PackageKey::parse("@scope-missing-name") {
//!     Ok(key) => println!("installing {key}"),
//!     Err(Error::InvalidPackageSpec(msg)) => eprintln!("bad spec: {msg}"),
//!     Err(e) if e.is_recoverable() => eprintln!("transient: {e}"),
//!     Err(e) => eprintln!("{}: {e}", e.category()),
//! }
//! ```

/// Configuration loading from config.toml and environment overrides
pub mod config;
/// Error types and result aliases
pub mod error;
/// HTTP retrieval of llms.txt indexes with retry and root fallback
pub mod fetcher;
/// Project-local `.erudita` link directory management
pub mod links;
/// Line-oriented llms.txt index parsing
pub mod parser;
/// Resolve-fetch-parse-store orchestration shared by every front end
pub mod pipeline;
/// Concurrency-bounded document fetching
pub mod pool;
/// `erudita.json` manifests and package.json dependency scanning
pub mod project;
/// npm registry client for resolving documentation origins
pub mod registry;
/// Percent-encoding helpers for cache-safe directory and file names
pub mod sanitize;
/// Local filesystem cache for acquired documentation
pub mod storage;
/// Core data types and structures
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use fetcher::{FetchedIndex, IndexFetcher, RetryPolicy, DEFAULT_TIMEOUT};
pub use links::{LinkManager, LinkMode, LINK_DIR};
pub use parser::{filter_by_prefix, parse_index};
pub use pipeline::{CacheReport, Pipeline};
pub use pool::{
    DocumentFetcher, FailedDocument, FetchPhase, FetchPool, FetchResults, ProgressCallback,
    DEFAULT_CONCURRENCY,
};
pub use project::{read_package_dependencies, DependencyFilter, ProjectManifest, MANIFEST_NAME};
pub use registry::{RegistryClient, DEFAULT_REGISTRY_URL};
pub use storage::DocStore;
pub use types::*;
