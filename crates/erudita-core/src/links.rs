//! Project-local links into the shared documentation cache.
//!
//! `erudita install` materializes each cached package inside the project
//! at `.erudita/<sanitized-key>`, either as a symlink to the cache entry
//! or as a deep copy for filesystems where symlinks are impractical.
//! Pruning keeps the link directory in lockstep with the project
//! manifest: anything not in the keep set is removed.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::sanitize::{desanitize, sanitize};
use crate::types::PackageKey;

/// Directory created inside a project to hold documentation links.
pub const LINK_DIR: &str = ".erudita";

/// How project links materialize cached documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Symlink into the shared cache.
    #[default]
    Link,
    /// Deep copy of the cache entry.
    Copy,
}

/// Manages the `.erudita` link directory of one project.
#[derive(Debug, Clone)]
pub struct LinkManager {
    dir: PathBuf,
}

impl LinkManager {
    /// Manager for the link directory under `project_dir`.
    #[must_use]
    pub fn new(project_dir: &Path) -> Self {
        Self {
            dir: project_dir.join(LINK_DIR),
        }
    }

    /// The link directory path (may not exist yet).
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates or replaces the project link for a package, pointing at its
    /// cache directory.
    pub fn create(&self, key: &PackageKey, cache_dir: &Path, mode: LinkMode) -> Result<PathBuf> {
        if !cache_dir.is_dir() {
            return Err(Error::NotFound(format!("'{key}' is not cached")));
        }
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::Storage(format!("Failed to create {}: {e}", self.dir.display()))
        })?;

        let entry = self.dir.join(sanitize(&key.to_string()));
        remove_entry(&entry)?;

        match mode {
            LinkMode::Link => {
                let target = fs::canonicalize(cache_dir).map_err(|e| {
                    Error::Storage(format!(
                        "Failed to resolve {}: {e}",
                        cache_dir.display()
                    ))
                })?;
                symlink_dir(&target, &entry)?;
            }
            LinkMode::Copy => copy_dir_recursive(cache_dir, &entry)?,
        }

        debug!(package = %key, path = %entry.display(), ?mode, "linked documentation");
        Ok(entry)
    }

    /// Removes the link for a package. Returns `false` when none existed.
    pub fn remove(&self, key: &PackageKey) -> Result<bool> {
        let entry = self.dir.join(sanitize(&key.to_string()));
        if fs::symlink_metadata(&entry).is_err() {
            return Ok(false);
        }
        remove_entry(&entry)?;
        Ok(true)
    }

    /// Removes every link whose key is not in `keep`, returning the
    /// removed keys sorted.
    pub fn prune(&self, keep: &HashSet<String>) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read {}: {e}",
                    self.dir.display()
                )));
            }
        };

        let mut removed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::Storage(format!("Failed to read {}: {e}", self.dir.display()))
            })?;
            let encoded = entry.file_name().to_string_lossy().into_owned();
            let link_key = desanitize(&encoded).unwrap_or_else(|_| encoded.clone());
            if keep.contains(&link_key) {
                continue;
            }
            remove_entry(&entry.path())?;
            debug!(package = %link_key, "pruned stale link");
            removed.push(link_key);
        }
        removed.sort();
        Ok(removed)
    }
}

/// Removes a link entry whatever its form. A symlink is unlinked rather
/// than traversed, so the cache entry behind it is never touched.
fn remove_entry(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::Storage(format!(
                "Failed to inspect {}: {e}",
                path.display()
            )));
        }
    };

    let result = if metadata.file_type().is_symlink() || metadata.is_file() {
        fs::remove_file(path)
    } else {
        fs::remove_dir_all(path)
    };
    result.map_err(|e| Error::Storage(format!("Failed to remove {}: {e}", path.display())))
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)
        .map_err(|e| Error::Storage(format!("Failed to link {}: {e}", link.display())))
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_dir(target, link).map_err(|e| {
        Error::Storage(format!(
            "Failed to link {} (symlinks may require developer mode; try copy mode): {e}",
            link.display()
        ))
    })
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .map_err(|e| Error::Storage(format!("Failed to create {}: {e}", dst.display())))?;
    let entries = fs::read_dir(src)
        .map_err(|e| Error::Storage(format!("Failed to read {}: {e}", src.display())))?;
    for entry in entries {
        let entry = entry
            .map_err(|e| Error::Storage(format!("Failed to read {}: {e}", src.display())))?;
        let file_type = entry.file_type().map_err(|e| {
            Error::Storage(format!("Failed to inspect {}: {e}", entry.path().display()))
        })?;
        let to = dst.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &to)?;
        } else {
            fs::copy(entry.path(), &to).map_err(|e| {
                Error::Storage(format!("Failed to copy {}: {e}", entry.path().display()))
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(spec: &str) -> PackageKey {
        PackageKey::parse(spec).unwrap()
    }

    /// Lays out a fake cache entry with an index and one document.
    fn fake_cache_entry(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("docs")).unwrap();
        fs::write(dir.join("llms.txt"), format!("# {name}\n")).unwrap();
        fs::write(dir.join("docs/guide.md"), "guide body").unwrap();
        dir
    }

    #[test]
    fn copy_mode_materializes_files() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = fake_cache_entry(tmp.path(), "react");
        let project = tmp.path().join("project");
        fs::create_dir_all(&project).unwrap();

        let manager = LinkManager::new(&project);
        let entry = manager
            .create(&key("react"), &cache_dir, LinkMode::Copy)
            .unwrap();

        assert!(entry.join("llms.txt").is_file());
        assert_eq!(
            fs::read_to_string(entry.join("docs/guide.md")).unwrap(),
            "guide body"
        );
        assert!(!fs::symlink_metadata(&entry).unwrap().file_type().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn link_mode_creates_symlink_to_cache() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = fake_cache_entry(tmp.path(), "react");
        let project = tmp.path().join("project");
        fs::create_dir_all(&project).unwrap();

        let manager = LinkManager::new(&project);
        let entry = manager
            .create(&key("react"), &cache_dir, LinkMode::Link)
            .unwrap();

        assert!(fs::symlink_metadata(&entry).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(entry.join("llms.txt")).unwrap(),
            "# react\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn create_replaces_existing_entry_with_new_mode() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = fake_cache_entry(tmp.path(), "react");
        let project = tmp.path().join("project");
        fs::create_dir_all(&project).unwrap();

        let manager = LinkManager::new(&project);
        manager
            .create(&key("react"), &cache_dir, LinkMode::Copy)
            .unwrap();
        let entry = manager
            .create(&key("react"), &cache_dir, LinkMode::Link)
            .unwrap();
        assert!(fs::symlink_metadata(&entry).unwrap().file_type().is_symlink());

        let entry = manager
            .create(&key("react"), &cache_dir, LinkMode::Copy)
            .unwrap();
        assert!(!fs::symlink_metadata(&entry).unwrap().file_type().is_symlink());
        assert!(entry.is_dir());
        assert_eq!(fs::read_dir(manager.dir()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn removing_a_symlink_leaves_the_cache_intact() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = fake_cache_entry(tmp.path(), "react");
        let project = tmp.path().join("project");
        fs::create_dir_all(&project).unwrap();

        let manager = LinkManager::new(&project);
        manager
            .create(&key("react"), &cache_dir, LinkMode::Link)
            .unwrap();
        assert!(manager.remove(&key("react")).unwrap());

        assert!(cache_dir.join("llms.txt").is_file());
        assert!(!manager.remove(&key("react")).unwrap());
    }

    #[test]
    fn create_requires_a_cached_package() {
        let tmp = TempDir::new().unwrap();
        let manager = LinkManager::new(tmp.path());
        let err = manager
            .create(&key("ghost"), &tmp.path().join("missing"), LinkMode::Copy)
            .unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[test]
    fn prune_removes_everything_not_kept() {
        let tmp = TempDir::new().unwrap();
        let cache_a = fake_cache_entry(tmp.path(), "a");
        let cache_b = fake_cache_entry(tmp.path(), "b");
        let project = tmp.path().join("project");
        fs::create_dir_all(&project).unwrap();

        let manager = LinkManager::new(&project);
        manager.create(&key("a"), &cache_a, LinkMode::Copy).unwrap();
        manager.create(&key("b"), &cache_b, LinkMode::Copy).unwrap();

        let keep: HashSet<String> = ["b".to_string()].into_iter().collect();
        let removed = manager.prune(&keep).unwrap();

        assert_eq!(removed, vec!["a".to_string()]);
        assert!(!manager.dir().join("a").exists());
        assert!(manager.dir().join("b").join("llms.txt").is_file());
    }

    #[test]
    fn prune_of_missing_directory_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let manager = LinkManager::new(tmp.path());
        assert!(manager.prune(&HashSet::new()).unwrap().is_empty());
    }

    #[test]
    fn scoped_keys_produce_safe_link_names() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = fake_cache_entry(tmp.path(), "types-node");
        let project = tmp.path().join("project");
        fs::create_dir_all(&project).unwrap();

        let manager = LinkManager::new(&project);
        let entry = manager
            .create(&key("@types/node"), &cache_dir, LinkMode::Copy)
            .unwrap();
        assert_eq!(
            entry.file_name().unwrap().to_str().unwrap(),
            "%40types%2Fnode"
        );
    }
}
