//! MCP server command implementation

use anyhow::Result;
use erudita_core::Config;
use tracing::debug;

/// Starts the MCP server on stdio. Logging is already initialized by the
/// CLI entry point with stderr as the writer, so stdout stays reserved
/// for JSON-RPC frames.
pub async fn execute(config: &Config) -> Result<()> {
    debug!("starting erudita MCP server on stdio");

    let server = erudita_mcp::McpServer::new(config)?;
    server.serve_stdio().await;

    Ok(())
}
