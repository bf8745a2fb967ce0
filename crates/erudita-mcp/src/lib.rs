//! erudita MCP server.
//!
//! Exposes the documentation cache to LLM runtimes as JSON-RPC methods
//! over stdio: `list_documentation`, `update_documentation`, and
//! `get_documentation`. The server is embeddable; the `erudita mcp`
//! subcommand hosts it and owns logging setup, which must write to
//! stderr so stdout stays reserved for protocol frames.

pub mod error;
pub mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use server::McpServer;
