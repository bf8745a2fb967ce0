//! Shared data types for packages, indexes, and cache metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A parsed package identifier: a name (optionally npm-scoped) plus an
/// optional version suffix.
///
/// The textual form is `name`, `name@version`, `@scope/name`, or
/// `@scope/name@version`. The version delimiter is the last `@` that
/// appears after the scope separator, so scoped names never lose their
/// leading `@`.
///
/// ```
/// use erudita_core::PackageKey;
///
/// let key = PackageKey::parse("@types/node@20.1.0").unwrap();
/// assert_eq!(key.name, "@types/node");
/// assert_eq!(key.version.as_deref(), Some("20.1.0"));
/// assert_eq!(key.to_string(), "@types/node@20.1.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey {
    /// Package name, including any `@scope/` prefix.
    pub name: String,
    /// Version suffix when the spec carried one.
    pub version: Option<String>,
}

impl PackageKey {
    /// Parses a package spec string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPackageSpec`] when the spec is empty, a
    /// scoped spec lacks a `/`, or the name portion is not a plausible
    /// package name.
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidPackageSpec("empty package spec".to_string()));
        }

        // For scoped specs the version delimiter can only appear after the
        // scope separator; `@scope/pkg@1.0` splits at the second `@`.
        let search_from = if trimmed.starts_with('@') {
            match trimmed.find('/') {
                Some(idx) => idx + 1,
                None => {
                    return Err(Error::InvalidPackageSpec(format!(
                        "scoped spec '{trimmed}' is missing a package name"
                    )));
                }
            }
        } else {
            0
        };

        let (name, version) = match trimmed[search_from..].rfind('@') {
            Some(rel) => {
                let at = search_from + rel;
                let version = &trimmed[at + 1..];
                (
                    &trimmed[..at],
                    (!version.is_empty()).then(|| version.to_string()),
                )
            }
            None => (trimmed, None),
        };

        Self::validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            version,
        })
    }

    /// Builds a key from an already-separated name and version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPackageSpec`] when the name is not a
    /// plausible package name.
    pub fn new(name: impl Into<String>, version: Option<String>) -> Result<Self> {
        let name = name.into();
        Self::validate_name(&name)?;
        Ok(Self { name, version })
    }

    fn validate_name(name: &str) -> Result<()> {
        let invalid = |detail: String| Err(Error::InvalidPackageSpec(detail));

        if name.is_empty() {
            return invalid("empty package name".to_string());
        }
        if name == "." || name == ".." {
            return invalid(format!("'{name}' is not a valid package name"));
        }
        if name.chars().any(char::is_whitespace) {
            return invalid(format!("package name '{name}' contains whitespace"));
        }

        if let Some(rest) = name.strip_prefix('@') {
            let Some((scope, pkg)) = rest.split_once('/') else {
                return invalid(format!("scoped name '{name}' is missing a package part"));
            };
            if scope.is_empty() || pkg.is_empty() {
                return invalid(format!("scoped name '{name}' has an empty component"));
            }
            if scope.contains('@') || pkg.contains('@') || pkg.contains('/') {
                return invalid(format!("'{name}' is not a valid package name"));
            }
        } else if name.contains('/') || name.contains('@') {
            return invalid(format!("'{name}' is not a valid package name"));
        }

        Ok(())
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{version}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for PackageKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A single documentation link parsed out of an llms.txt index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Display title, composed from the current section and the link label.
    pub title: String,
    /// Link target exactly as written in the index.
    pub url: String,
    /// Trailing description after the link, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Structured view of an llms.txt index document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Text of the first H1 heading, empty when the document has none.
    pub title: String,
    /// Joined text of the first blockquote block, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Every link entry in document order.
    pub entries: Vec<IndexEntry>,
}

impl IndexDocument {
    /// Returns `true` when the document carries no title, no description,
    /// and no entries. Such a document is not worth caching.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_none() && self.entries.is_empty()
    }
}

/// Metadata persisted alongside each cached package as `meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMeta {
    /// Full package key string, e.g. `react@18.2.0`.
    pub name: String,
    /// Origin base URL the documentation was fetched from.
    pub source_url: String,
    /// When the cache entry was written.
    pub fetched_at: DateTime<Utc>,
}
