//! Embeddable MCP trait for in-process execution
//!
//! Lets a host (or a test) call a server's tools directly, without spawning
//! the server binary or speaking the stdio protocol.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//! use portcheck_mcp::PortCheckMcpServer;
//!
//! let server = PortCheckMcpServer::new();
//! let names: Vec<_> = server.list_tools().into_iter().map(|t| t.name).collect();
//! let result = server
//!     .call_tool("which-app-on-port", serde_json::json!({ "port": "8080" }))
//!     .await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

/// Error type for embeddable MCP operations
///
/// Only failures to *reach* a tool live here. A tool that runs and refuses
/// the request reports that through an error `CallToolResult` instead.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// Tool was not found in the server
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments did not match the tool's parameter type
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] serde_json::Error),
}

/// Result type for embeddable MCP operations
pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// Trait for MCP servers that can be executed in-process
///
/// Implementations must be `Send + Sync` so one server can serve concurrent
/// calls from several tasks.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Returns the server name for identification
    fn server_name(&self) -> &str;

    /// Returns every tool with its name, description, and input schema
    fn list_tools(&self) -> Vec<Tool>;

    /// Executes a tool by name with a JSON object of arguments
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    /// Returns an optional description of the server
    fn server_description(&self) -> Option<&str> {
        None
    }
}
