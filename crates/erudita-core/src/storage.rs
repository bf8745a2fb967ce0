//! On-disk layout and persistence for cached package documentation.
//!
//! Each cached package lives under `<root>/packages/<sanitized-key>/`:
//!
//! ```text
//! packages/
//!   react%4018.2.0/
//!     meta.json       package name, source URL, fetch timestamp
//!     llms.txt        raw index text as fetched
//!     docs/           one file per fetched document
//! ```
//!
//! Files are written through a temp-file rename so a crash mid-write
//! never leaves a torn file. `meta.json` is written last; its presence
//! marks a complete entry, and unreadable metadata is treated as absence
//! rather than an error.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::sanitize::{desanitize, sanitize};
use crate::types::{PackageKey, PackageMeta};

/// Filename of the raw index inside a package directory.
pub const INDEX_FILE: &str = "llms.txt";

/// Filename of the metadata record inside a package directory.
pub const META_FILE: &str = "meta.json";

/// Subdirectory holding fetched documents.
pub const DOCS_DIR: &str = "docs";

const PACKAGES_DIR: &str = "packages";

/// Filesystem store for cached documentation.
#[derive(Debug, Clone)]
pub struct DocStore {
    root: PathBuf,
}

impl DocStore {
    /// Opens (and creates if needed) a store rooted at the given path.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let packages = root.join(PACKAGES_DIR);
        fs::create_dir_all(&packages).map_err(|e| {
            Error::Storage(format!(
                "Failed to create cache directory {}: {e}",
                packages.display()
            ))
        })?;
        Ok(Self { root })
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a package's documentation lives in (whether or not it
    /// exists yet).
    #[must_use]
    pub fn package_dir(&self, key: &PackageKey) -> PathBuf {
        self.root
            .join(PACKAGES_DIR)
            .join(sanitize(&key.to_string()))
    }

    /// Whether documentation for this exact key is cached. A cheap
    /// directory check; completeness is judged by [`Self::meta`].
    #[must_use]
    pub fn is_cached(&self, key: &PackageKey) -> bool {
        self.package_dir(key).is_dir()
    }

    /// Persists a fetched documentation set, replacing any previous entry
    /// for the same key.
    pub fn cache(
        &self,
        key: &PackageKey,
        source_url: &str,
        index_text: &str,
        documents: &HashMap<String, String>,
    ) -> Result<PackageMeta> {
        let dir = self.package_dir(key);
        let docs_dir = dir.join(DOCS_DIR);

        fs::create_dir_all(&dir).map_err(|e| {
            Error::Storage(format!("Failed to create {}: {e}", dir.display()))
        })?;

        // The docs set is replaced wholesale so files from a previous
        // fetch never survive a re-cache.
        if docs_dir.exists() {
            fs::remove_dir_all(&docs_dir).map_err(|e| {
                Error::Storage(format!("Failed to clear {}: {e}", docs_dir.display()))
            })?;
        }
        fs::create_dir_all(&docs_dir).map_err(|e| {
            Error::Storage(format!("Failed to create {}: {e}", docs_dir.display()))
        })?;

        write_atomic(&dir.join(INDEX_FILE), index_text)?;
        for (filename, content) in documents {
            write_atomic(&docs_dir.join(sanitize(filename)), content)?;
        }

        let meta = PackageMeta {
            name: key.to_string(),
            source_url: source_url.to_string(),
            fetched_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&meta)?;
        write_atomic(&dir.join(META_FILE), &json)?;

        debug!(package = %key, documents = documents.len(), "cached documentation");
        Ok(meta)
    }

    /// Metadata for a cached package, or `None` when the entry is missing
    /// or its metadata is unreadable.
    pub fn meta(&self, key: &PackageKey) -> Result<Option<PackageMeta>> {
        read_meta_file(&self.package_dir(key).join(META_FILE))
    }

    /// Raw index text for a cached package.
    pub fn index_text(&self, key: &PackageKey) -> Result<Option<String>> {
        read_optional(&self.package_dir(key).join(INDEX_FILE))
    }

    /// A single cached document by its original (unsanitized) filename.
    pub fn document(&self, key: &PackageKey, filename: &str) -> Result<Option<String>> {
        let path = self
            .package_dir(key)
            .join(DOCS_DIR)
            .join(sanitize(filename));
        read_optional(&path)
    }

    /// Original filenames of every cached document for a package, sorted.
    pub fn document_names(&self, key: &PackageKey) -> Result<Vec<String>> {
        let docs_dir = self.package_dir(key).join(DOCS_DIR);
        let entries = match fs::read_dir(&docs_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read {}: {e}",
                    docs_dir.display()
                )));
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::Storage(format!("Failed to read {}: {e}", docs_dir.display()))
            })?;
            let encoded = entry.file_name().to_string_lossy().into_owned();
            match desanitize(&encoded) {
                Ok(name) => names.push(name),
                Err(e) => warn!(file = %encoded, error = %e, "skipping undecodable document"),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Reads cached content by the path form used in listings: empty or
    /// `llms.txt` for the index, `docs/<file>` for a document, with a bare
    /// filename accepted as shorthand for `docs/<file>`. Absolute paths
    /// and traversal segments never resolve.
    pub fn read_path(&self, key: &PackageKey, doc_path: &str) -> Result<Option<String>> {
        let trimmed = doc_path.trim();
        if trimmed.is_empty() || trimmed == INDEX_FILE {
            return self.index_text(key);
        }
        if trimmed.starts_with('/') || trimmed.split('/').any(|segment| segment == "..") {
            return Ok(None);
        }
        let name = trimmed.strip_prefix("docs/").unwrap_or(trimmed);
        if name.is_empty() || name.contains('/') {
            return Ok(None);
        }
        self.document(key, name)
    }

    /// Metadata for every complete cache entry, sorted by name. Entries
    /// with missing or unreadable metadata are skipped.
    pub fn list(&self) -> Result<Vec<PackageMeta>> {
        let packages = self.root.join(PACKAGES_DIR);
        let entries = match fs::read_dir(&packages) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read {}: {e}",
                    packages.display()
                )));
            }
        };

        let mut metas = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::Storage(format!("Failed to read {}: {e}", packages.display()))
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(meta) = read_meta_file(&entry.path().join(META_FILE))? {
                metas.push(meta);
            }
        }
        metas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(metas)
    }

    /// Cache keys whose package name is exactly `name`, sorted. Used to
    /// suggest alternatives when a requested version is not cached.
    pub fn cached_versions(&self, name: &str) -> Result<Vec<String>> {
        let mut matches = Vec::new();
        for meta in self.list()? {
            if let Ok(cached) = PackageKey::parse(&meta.name) {
                if cached.name == name {
                    matches.push(meta.name);
                }
            }
        }
        Ok(matches)
    }

    /// Removes a cached package. Returns `false` when nothing was cached
    /// under the key.
    pub fn remove(&self, key: &PackageKey) -> Result<bool> {
        let dir = self.package_dir(key);
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to remove {}: {e}", dir.display())))?;
        debug!(package = %key, "removed cached documentation");
        Ok(true)
    }

    /// Deletes the entire cache root and recreates it empty.
    pub fn clear_all(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| {
                Error::Storage(format!("Failed to clear {}: {e}", self.root.display()))
            })?;
        }
        let packages = self.root.join(PACKAGES_DIR);
        fs::create_dir_all(&packages).map_err(|e| {
            Error::Storage(format!("Failed to recreate {}: {e}", packages.display()))
        })?;
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Storage(format!(
            "Failed to read {}: {e}",
            path.display()
        ))),
    }
}

fn read_meta_file(path: &Path) -> Result<Option<PackageMeta>> {
    let Some(raw) = read_optional(path)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable package metadata");
            Ok(None)
        }
    }
}

/// Writes through a sibling temp file and renames into place.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, contents)
        .map_err(|e| Error::Storage(format!("Failed to write {}: {e}", tmp.display())))?;

    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            Error::Storage(format!("Failed to replace {}: {e}", path.display()))
        })?;
    }

    fs::rename(&tmp, path)
        .map_err(|e| Error::Storage(format!("Failed to commit {}: {e}", path.display())))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(OsString::new, ToOwned::to_owned);
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, DocStore) {
        let dir = TempDir::new().unwrap();
        let store = DocStore::new(dir.path().join("cache")).unwrap();
        (dir, store)
    }

    fn key(spec: &str) -> PackageKey {
        PackageKey::parse(spec).unwrap()
    }

    fn docs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, content)| ((*name).to_string(), (*content).to_string()))
            .collect()
    }

    #[test]
    fn cache_then_read_round_trips() {
        let (_tmp, store) = store();
        let key = key("react@18.2.0");
        let documents = docs(&[("intro.md", "# Intro"), ("hooks.md", "# Hooks")]);

        let meta = store
            .cache(&key, "https://react.dev", "# React\n", &documents)
            .unwrap();
        assert_eq!(meta.name, "react@18.2.0");
        assert_eq!(meta.source_url, "https://react.dev");

        assert!(store.is_cached(&key));
        assert_eq!(store.index_text(&key).unwrap().unwrap(), "# React\n");
        assert_eq!(
            store.document(&key, "intro.md").unwrap().unwrap(),
            "# Intro"
        );
        assert_eq!(
            store.document_names(&key).unwrap(),
            vec!["hooks.md", "intro.md"]
        );

        let listed = store.meta(&key).unwrap().unwrap();
        assert_eq!(listed.name, meta.name);
        assert_eq!(listed.source_url, meta.source_url);
    }

    #[test]
    fn recache_replaces_documents_wholesale() {
        let (_tmp, store) = store();
        let key = key("lodash");

        store
            .cache(&key, "https://lodash.com", "# v1\n", &docs(&[("old.md", "old")]))
            .unwrap();
        store
            .cache(&key, "https://lodash.com", "# v2\n", &docs(&[("new.md", "new")]))
            .unwrap();

        assert_eq!(store.index_text(&key).unwrap().unwrap(), "# v2\n");
        assert_eq!(store.document(&key, "old.md").unwrap(), None);
        assert_eq!(store.document(&key, "new.md").unwrap().unwrap(), "new");
        assert_eq!(store.document_names(&key).unwrap(), vec!["new.md"]);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn scoped_keys_map_to_safe_directories() {
        let (_tmp, store) = store();
        let key = key("@types/node@20.1.0");
        store
            .cache(&key, "https://nodejs.org", "# Node\n", &HashMap::new())
            .unwrap();

        let dir = store.package_dir(&key);
        assert!(dir.is_dir());
        assert_eq!(
            dir.file_name().unwrap().to_str().unwrap(),
            "%40types%2Fnode%4020.1.0"
        );
        assert!(store.is_cached(&key));
    }

    #[test]
    fn meta_json_uses_camel_case_on_disk() {
        let (_tmp, store) = store();
        let key = key("react");
        store
            .cache(&key, "https://react.dev", "# R\n", &HashMap::new())
            .unwrap();

        let raw = fs::read_to_string(store.package_dir(&key).join(META_FILE)).unwrap();
        assert!(raw.contains("\"sourceUrl\""));
        assert!(raw.contains("\"fetchedAt\""));
        assert!(raw.contains("\"name\""));
    }

    #[test]
    fn malformed_meta_reads_as_absent() {
        let (_tmp, store) = store();
        let key = key("broken");
        store
            .cache(&key, "https://broken.test", "# B\n", &HashMap::new())
            .unwrap();
        fs::write(store.package_dir(&key).join(META_FILE), "{oops").unwrap();

        assert_eq!(store.meta(&key).unwrap(), None);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_returns_sorted_complete_entries() {
        let (_tmp, store) = store();
        for name in ["zeta", "alpha", "mid"] {
            store
                .cache(&key(name), "https://x.test", "# X\n", &HashMap::new())
                .unwrap();
        }
        // A stray directory without meta.json is skipped.
        fs::create_dir_all(store.root().join("packages/stray")).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn read_path_resolves_listing_paths() {
        let (_tmp, store) = store();
        let key = key("react");
        store
            .cache(
                &key,
                "https://react.dev",
                "# React\n",
                &docs(&[("intro.md", "intro body")]),
            )
            .unwrap();

        assert_eq!(store.read_path(&key, "").unwrap().unwrap(), "# React\n");
        assert_eq!(
            store.read_path(&key, "llms.txt").unwrap().unwrap(),
            "# React\n"
        );
        assert_eq!(
            store.read_path(&key, "docs/intro.md").unwrap().unwrap(),
            "intro body"
        );
        assert_eq!(
            store.read_path(&key, "intro.md").unwrap().unwrap(),
            "intro body"
        );
        assert_eq!(store.read_path(&key, "docs/missing.md").unwrap(), None);
    }

    #[test]
    fn read_path_rejects_traversal() {
        let (_tmp, store) = store();
        let key = key("react");
        store
            .cache(&key, "https://react.dev", "# R\n", &HashMap::new())
            .unwrap();

        assert_eq!(store.read_path(&key, "../other/llms.txt").unwrap(), None);
        assert_eq!(store.read_path(&key, "docs/../meta.json").unwrap(), None);
        assert_eq!(store.read_path(&key, "/etc/passwd").unwrap(), None);
        assert_eq!(store.read_path(&key, "docs/a/b.md").unwrap(), None);
    }

    #[test]
    fn cached_versions_match_on_exact_name() {
        let (_tmp, store) = store();
        for spec in ["react@17.0.0", "react@18.2.0", "@types/react@18.0.0", "vue"] {
            store
                .cache(&key(spec), "https://x.test", "# X\n", &HashMap::new())
                .unwrap();
        }

        assert_eq!(
            store.cached_versions("react").unwrap(),
            vec!["react@17.0.0", "react@18.2.0"]
        );
        assert_eq!(
            store.cached_versions("@types/react").unwrap(),
            vec!["@types/react@18.0.0"]
        );
        assert!(store.cached_versions("svelte").unwrap().is_empty());
    }

    #[test]
    fn remove_reports_presence() {
        let (_tmp, store) = store();
        let key = key("react");
        assert!(!store.remove(&key).unwrap());

        store
            .cache(&key, "https://react.dev", "# R\n", &HashMap::new())
            .unwrap();
        assert!(store.remove(&key).unwrap());
        assert!(!store.is_cached(&key));
    }

    #[test]
    fn clear_all_empties_the_store() {
        let (_tmp, store) = store();
        store
            .cache(&key("a"), "https://a.test", "# A\n", &HashMap::new())
            .unwrap();
        store
            .cache(&key("b"), "https://b.test", "# B\n", &HashMap::new())
            .unwrap();

        store.clear_all().unwrap();
        assert!(store.list().unwrap().is_empty());
        // The store remains usable after clearing.
        store
            .cache(&key("c"), "https://c.test", "# C\n", &HashMap::new())
            .unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn versioned_and_unversioned_keys_are_distinct_entries() {
        let (_tmp, store) = store();
        let plain = key("react");
        let pinned = key("react@18.2.0");

        store
            .cache(&plain, "https://react.dev", "# latest\n", &HashMap::new())
            .unwrap();
        assert!(!store.is_cached(&pinned));

        store
            .cache(&pinned, "https://react.dev", "# pinned\n", &HashMap::new())
            .unwrap();
        assert_eq!(store.index_text(&plain).unwrap().unwrap(), "# latest\n");
        assert_eq!(store.index_text(&pinned).unwrap().unwrap(), "# pinned\n");
        assert_eq!(store.list().unwrap().len(), 2);
    }
}
