//! MCP tools for the erudita documentation cache

pub mod get;
pub mod list;
pub mod update;

pub use get::{GetDocumentationOutput, GetDocumentationParams, handle_get_documentation};
pub use list::{DocEntry, ListDocumentationOutput, handle_list_documentation};
pub use update::{
    UpdateDocumentationOutput, UpdateDocumentationParams, handle_update_documentation,
};

use erudita_core::PackageKey;

use crate::error::{McpError, McpResult};

/// Builds a package key from the `packageName` and optional `version`
/// parameters shared by the update and get tools.
///
/// The name may itself carry a version suffix (`react@18.2.0`); supplying
/// the suffix and the `version` parameter at the same time is rejected
/// rather than silently preferring one.
fn key_from(package_name: &str, version: Option<&str>) -> McpResult<PackageKey> {
    let mut key = PackageKey::parse(package_name)
        .map_err(|e| McpError::InvalidParams(format!("packageName: {e}")))?;

    if let Some(version) = version {
        let version = version.trim();
        if version.is_empty() {
            return Err(McpError::InvalidParams(
                "version must not be empty".to_string(),
            ));
        }
        if let Some(existing) = &key.version {
            return Err(McpError::InvalidParams(format!(
                "version given twice: '{existing}' in '{package_name}' and '{version}' as a parameter"
            )));
        }
        key.version = Some(version.to_string());
    }

    Ok(key)
}
