//! Error types for the MCP server with JSON-RPC error code mapping

use thiserror::Error;

/// Errors that can occur while serving MCP requests.
#[derive(Debug, Error)]
pub enum McpError {
    /// Underlying cache or pipeline failure.
    #[error("cache error: {0}")]
    Core(#[from] erudita_core::Error),

    /// JSON serialization error while shaping a response.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid parameter provided by the client.
    #[error("invalid parameter: {0}")]
    InvalidParams(String),

    /// The requested package is not in the cache.
    #[error("package not cached: {0}")]
    PackageNotCached(String),

    /// The requested document path does not exist for a cached package.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Map the error onto a JSON-RPC error code.
    pub const fn error_code(&self) -> i32 {
        match self {
            Self::Core(_) | Self::Internal(_) => -32603, // Internal error
            Self::Json(_) => -32700,                     // Parse error
            Self::InvalidParams(_) | Self::PackageNotCached(_) | Self::DocumentNotFound(_) => {
                -32602 // Invalid params
            }
        }
    }
}

impl From<McpError> for jsonrpc_core::Error {
    fn from(err: McpError) -> Self {
        let code = match err.error_code() {
            -32700 => jsonrpc_core::ErrorCode::ParseError,
            -32602 => jsonrpc_core::ErrorCode::InvalidParams,
            -32603 => jsonrpc_core::ErrorCode::InternalError,
            code => jsonrpc_core::ErrorCode::ServerError(i64::from(code)),
        };
        Self {
            code,
            message: err.to_string(),
            data: None,
        }
    }
}

/// Result type alias for MCP operations.
pub type McpResult<T> = Result<T, McpError>;
