//! Error types for erudita operations.
//!
//! Every fallible operation in this crate returns [`Result`], an alias for
//! `std::result::Result<T, Error>`. Variants are grouped by the stage that
//! produces them: spec parsing, origin resolution, index fetching, and cache
//! storage. [`Error::is_recoverable`] distinguishes transient failures that a
//! retry might fix from definitive ones.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during documentation acquisition and caching.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error from filesystem operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error from HTTP operations.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A URL could not be parsed or is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A package spec string could not be parsed.
    #[error("Invalid package spec: {0}")]
    InvalidPackageSpec(String),

    /// No documentation origin could be resolved for a package.
    #[error("No documentation origin found for '{0}'")]
    OriginNotFound(String),

    /// No llms.txt index was found at any candidate URL for a base.
    #[error("No llms.txt index found at {0}")]
    IndexNotFound(String),

    /// An index was fetched but is unusable.
    #[error("Invalid documentation index: {0}")]
    IndexInvalid(String),

    /// A requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cache storage failure with operation context.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns `true` when the error is transient and worth retrying.
    ///
    /// Network timeouts and connection failures qualify; definitive
    /// conditions such as a missing index or an invalid spec do not.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Stable category label for logging and diagnostics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::InvalidUrl(_) => "invalid_url",
            Self::InvalidPackageSpec(_) => "invalid_spec",
            Self::OriginNotFound(_) => "origin_not_found",
            Self::IndexNotFound(_) => "index_not_found",
            Self::IndexInvalid(_) => "index_invalid",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
