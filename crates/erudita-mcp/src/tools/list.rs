//! Tool for listing cached documentation

use erudita_core::{DocStore, PackageKey};
use serde::Serialize;

use crate::error::McpResult;

/// Output from `list_documentation`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentationOutput {
    /// One entry per cached package
    pub docs: Vec<DocEntry>,
}

/// Individual cached package entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocEntry {
    /// Package name, including any `@scope/` prefix
    pub name: String,
    /// Cached version, when the entry was installed with one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// When the entry was fetched, in RFC3339 format
    pub last_updated: String,
    /// Readable document paths, starting with the index
    pub paths: Vec<String>,
}

/// Handle `list_documentation`
#[tracing::instrument(skip(store))]
pub fn handle_list_documentation(store: &DocStore) -> McpResult<ListDocumentationOutput> {
    let mut docs = Vec::new();

    for meta in store.list()? {
        let Ok(key) = PackageKey::parse(&meta.name) else {
            tracing::warn!(package = %meta.name, "skipping entry with unparsable name");
            continue;
        };

        let mut paths = vec!["llms.txt".to_string()];
        paths.extend(
            store
                .document_names(&key)?
                .into_iter()
                .map(|name| format!("docs/{name}")),
        );

        docs.push(DocEntry {
            name: key.name,
            version: key.version,
            last_updated: meta.fetched_at.to_rfc3339(),
            paths,
        });
    }

    tracing::debug!(count = docs.len(), "listed cached documentation");

    Ok(ListDocumentationOutput { docs })
}
