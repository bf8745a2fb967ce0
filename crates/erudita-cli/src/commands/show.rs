//! Show command: print cached documentation to stdout.

use anyhow::Result;
use erudita_core::{Config, DocStore, PackageKey};

/// Prints the cached index for a package, or a single document when
/// `doc` names one. Content goes to stdout untouched so it pipes cleanly.
pub fn execute(config: &Config, spec: &str, doc: Option<&str>) -> Result<()> {
    let key = PackageKey::parse(spec)?;
    let store = DocStore::new(&config.cache_root)?;

    if !store.is_cached(&key) {
        let versions = store.cached_versions(&key.name)?;
        if versions.is_empty() {
            anyhow::bail!("'{key}' is not cached. Use 'erudita install {key}' first.");
        }
        anyhow::bail!(
            "'{key}' is not cached. Cached versions: {}",
            versions.join(", ")
        );
    }

    match doc {
        Some(path) => {
            if let Some(content) = store.read_path(&key, path)? {
                print!("{content}");
            } else {
                let names = store.document_names(&key)?;
                if names.is_empty() {
                    anyhow::bail!(
                        "no document at '{path}' for '{key}'; only the index (llms.txt) is cached"
                    );
                }
                anyhow::bail!(
                    "no document at '{path}' for '{key}'. Cached documents: {}",
                    names
                        .iter()
                        .map(|name| format!("docs/{name}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        },
        None => {
            if let Some(text) = store.index_text(&key)? {
                print!("{text}");
            } else {
                anyhow::bail!("cache entry for '{key}' has no index; try 'erudita update {key}'");
            }
        },
    }

    Ok(())
}
