//! Tool for reading cached documentation content

use erudita_core::DocStore;
use serde::{Deserialize, Serialize};

use crate::error::{McpError, McpResult};

/// Parameters for `get_documentation`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDocumentationParams {
    /// Package name, optionally with a version suffix
    pub package_name: String,

    /// Version, when not part of the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Document path from `list_documentation`; the index when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Output from `get_documentation`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDocumentationOutput {
    /// Raw document text
    pub content: String,
}

/// Handle `get_documentation`
#[tracing::instrument(skip(store))]
pub fn handle_get_documentation(
    params: GetDocumentationParams,
    store: &DocStore,
) -> McpResult<GetDocumentationOutput> {
    tracing::debug!(?params, "reading documentation");

    let key = super::key_from(&params.package_name, params.version.as_deref())?;

    if !store.is_cached(&key) {
        let cached = store.cached_versions(&key.name)?;
        let detail = if cached.is_empty() {
            format!("'{key}'")
        } else {
            format!("'{key}'; cached versions: {}", cached.join(", "))
        };
        return Err(McpError::PackageNotCached(detail));
    }

    let path = params.path.as_deref().unwrap_or("llms.txt");
    match store.read_path(&key, path)? {
        Some(content) => Ok(GetDocumentationOutput { content }),
        None => {
            let mut available = vec!["llms.txt".to_string()];
            available.extend(
                store
                    .document_names(&key)?
                    .into_iter()
                    .map(|name| format!("docs/{name}")),
            );
            Err(McpError::DocumentNotFound(format!(
                "'{path}' for '{key}'; available: {}",
                available.join(", ")
            )))
        }
    }
}
