//! Per-project manifest and package.json dependency scanning.
//!
//! `erudita.json` records which packages a project tracks together with
//! the documentation origin each one resolved to at install time, so a
//! later reconciliation can refetch without asking the registry again.
//! A missing or unreadable manifest reads as empty; it is recreated on
//! the next save.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Filename of the per-project manifest.
pub const MANIFEST_NAME: &str = "erudita.json";

const PACKAGE_JSON: &str = "package.json";

/// Which package.json dependency groups to consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyFilter {
    /// `dependencies` and `devDependencies`.
    #[default]
    All,
    /// `dependencies` only.
    Prod,
    /// `devDependencies` only.
    Dev,
}

/// One tracked package in the project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Documentation origin recorded when the package was installed.
    pub url: String,
}

/// The `erudita.json` manifest: package keys mapped to recorded origins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Tracked packages, keyed by full package key string.
    #[serde(default)]
    pub packages: BTreeMap<String, ManifestEntry>,
}

impl ProjectManifest {
    /// Loads the manifest from a project directory. Missing or unreadable
    /// manifests read as empty.
    #[must_use]
    pub fn load(project_dir: &Path) -> Self {
        let path = project_dir.join(MANIFEST_NAME);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "cannot read project manifest");
                }
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed project manifest, starting empty");
                Self::default()
            }
        }
    }

    /// Writes the manifest back to the project directory.
    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let path = project_dir.join(MANIFEST_NAME);
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(&path, json)?;
        Ok(())
    }

    /// Records (or re-records) a tracked package and its origin.
    pub fn insert(&mut self, key: String, url: String) {
        self.packages.insert(key, ManifestEntry { url });
    }

    /// Stops tracking a package. Returns `false` when it was not tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        self.packages.remove(key).is_some()
    }

    /// Whether a package key is tracked.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.packages.contains_key(key)
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, String>,
}

/// Reads dependency names from a project's package.json, filtered by
/// group and sorted.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the project has no package.json and
/// [`Error::Serialization`] when it cannot be parsed.
pub fn read_package_dependencies(
    project_dir: &Path,
    filter: DependencyFilter,
) -> Result<Vec<String>> {
    let path = project_dir.join(PACKAGE_JSON);
    let raw = fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(format!("no {PACKAGE_JSON} in {}", project_dir.display()))
        } else {
            Error::Io(e)
        }
    })?;
    let parsed: PackageJson = serde_json::from_str(&raw)?;

    let mut names: Vec<String> = match filter {
        DependencyFilter::All => parsed
            .dependencies
            .keys()
            .chain(parsed.dev_dependencies.keys())
            .cloned()
            .collect(),
        DependencyFilter::Prod => parsed.dependencies.keys().cloned().collect(),
        DependencyFilter::Dev => parsed.dev_dependencies.keys().cloned().collect(),
    };
    names.sort();
    names.dedup();
    Ok(names)
}
