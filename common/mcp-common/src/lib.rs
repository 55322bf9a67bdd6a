//! MCP Common - Shared utilities for MCP servers
//!
//! This crate provides common functionality used across the workspace's servers:
//!
//! - **Initialization**: `serve_stdio!` macro for standardized server startup
//! - **Results**: Helper functions for creating `CallToolResult` responses
//! - **Embeddable**: [`EmbeddableMcp`] trait for in-process execution
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{serve_stdio, text_error, text_success};
//!
//! // In main.rs
//! serve_stdio!(MyServer, "my_mcp");
//!
//! // In tool implementations
//! fn my_tool(&self, ok: bool) -> CallToolResult {
//!     if ok { text_success("done") } else { text_error("refused") }
//! }
//! ```

pub mod embeddable;
pub mod init;
pub mod result;

// Re-export commonly used items at crate root
pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use init::init_tracing;
pub use result::{text_error, text_success};

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

// Re-export async_trait for implementing EmbeddableMcp
pub use async_trait::async_trait;
