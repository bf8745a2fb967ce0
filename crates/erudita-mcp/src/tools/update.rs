//! Tool for refreshing cached documentation

use erudita_core::{Error as CoreError, Pipeline};
use serde::{Deserialize, Serialize};

use crate::error::McpResult;

/// Parameters for `update_documentation`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentationParams {
    /// Package name, optionally with a version suffix
    pub package_name: String,

    /// Version, when not part of the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Output from `update_documentation`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentationOutput {
    /// Whether the refresh completed
    pub success: bool,
    /// Human-readable outcome description
    pub message: String,
}

/// Failures the client can act on (bad origin, unreachable host, unusable
/// index) come back as unsuccessful results rather than protocol errors.
/// Cache storage failures stay errors.
const fn is_acquisition_failure(err: &CoreError) -> bool {
    matches!(
        err,
        CoreError::Network(_)
            | CoreError::InvalidUrl(_)
            | CoreError::OriginNotFound(_)
            | CoreError::IndexNotFound(_)
            | CoreError::IndexInvalid(_)
            | CoreError::NotFound(_)
    )
}

/// Handle `update_documentation`
#[tracing::instrument(skip(pipeline))]
pub async fn handle_update_documentation(
    params: UpdateDocumentationParams,
    pipeline: &Pipeline,
) -> McpResult<UpdateDocumentationOutput> {
    tracing::debug!(?params, "updating documentation");

    let key = super::key_from(&params.package_name, params.version.as_deref())?;

    let Some(meta) = pipeline.store().meta(&key)? else {
        let cached = pipeline.store().cached_versions(&key.name)?;
        let message = if cached.is_empty() {
            format!("'{key}' is not cached; run 'erudita install {key}' first")
        } else {
            format!("'{key}' is not cached; cached versions: {}", cached.join(", "))
        };
        return Ok(UpdateDocumentationOutput {
            success: false,
            message,
        });
    };

    match pipeline.cache_package_from(&key, &meta.source_url, None).await {
        Ok(report) => Ok(UpdateDocumentationOutput {
            success: true,
            message: format!(
                "updated '{key}' from {}: {} documents, {} failed",
                report.origin, report.documents, report.failures
            ),
        }),
        Err(e) if is_acquisition_failure(&e) => {
            tracing::warn!(package = %key, error = %e, "update failed");
            Ok(UpdateDocumentationOutput {
                success: false,
                message: format!("update of '{key}' failed: {e}"),
            })
        }
        Err(e) => Err(e.into()),
    }
}
