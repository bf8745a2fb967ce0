//! JSON-RPC server wiring for the MCP tools.
//!
//! Each tool is registered as a method on a [`jsonrpc_core::IoHandler`];
//! [`McpServer::serve_stdio`] drives that handler over stdin/stdout until
//! the client closes the stream. Handlers share one [`Pipeline`] so the
//! server reads and refreshes the same cache the CLI writes.

use std::sync::Arc;

use erudita_core::{Config, Pipeline};
use jsonrpc_core::{IoHandler, Params, Value};
use jsonrpc_stdio_server::ServerBuilder;
use tracing::info;

use crate::error::{McpError, McpResult};
use crate::tools;

/// MCP server exposing the documentation cache over JSON-RPC.
pub struct McpServer {
    pipeline: Arc<Pipeline>,
}

impl McpServer {
    /// Builds a server from resolved configuration.
    pub fn new(config: &Config) -> McpResult<Self> {
        Ok(Self {
            pipeline: Arc::new(Pipeline::from_config(config)?),
        })
    }

    /// Registers every tool on a fresh handler.
    fn io_handler(&self) -> IoHandler {
        let mut io = IoHandler::new();

        let pipeline = Arc::clone(&self.pipeline);
        io.add_method("list_documentation", move |_params: Params| {
            let pipeline = Arc::clone(&pipeline);
            async move {
                let output = tools::handle_list_documentation(pipeline.store())?;
                to_rpc_value(output)
            }
        });

        let pipeline = Arc::clone(&self.pipeline);
        io.add_method("update_documentation", move |params: Params| {
            let pipeline = Arc::clone(&pipeline);
            async move {
                let params = params.parse()?;
                let output = tools::handle_update_documentation(params, &pipeline).await?;
                to_rpc_value(output)
            }
        });

        let pipeline = Arc::clone(&self.pipeline);
        io.add_method("get_documentation", move |params: Params| {
            let pipeline = Arc::clone(&pipeline);
            async move {
                let params = params.parse()?;
                let output = tools::handle_get_documentation(params, pipeline.store())?;
                to_rpc_value(output)
            }
        });

        io
    }

    /// Serves JSON-RPC over stdin/stdout until the client disconnects.
    pub async fn serve_stdio(&self) {
        info!("erudita MCP server listening on stdio");
        ServerBuilder::new(self.io_handler()).build().await;
        info!("erudita MCP server stopped");
    }
}

fn to_rpc_value<T: serde::Serialize>(output: T) -> Result<Value, jsonrpc_core::Error> {
    serde_json::to_value(output).map_err(|e| McpError::Json(e).into())
}
