//! Port Check MCP Library
//!
//! Answers "which process owns TCP port P" without letting the caller's input
//! become shell syntax. Ports and PIDs are checked against strict grammars,
//! commands run as argument vectors, and a denylist scan rides along as a
//! second layer.
//!
//! The crate also ships a deliberately vulnerable twin that interpolates the
//! same inputs into `sh -c`, so attack tests have something to compare with.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//! use portcheck_mcp::PortCheckMcpServer;
//!
//! let server = PortCheckMcpServer::new();
//! let result = server
//!     .call_tool("which-app-on-port", serde_json::json!({ "port": "8080" }))
//!     .await?;
//! ```

pub mod command;
pub mod guard;
pub mod handlers;
pub mod lookup;
pub mod params;
pub mod server;
pub mod types;
pub mod validation;
pub mod vulnerable;
pub mod vulnerable_server;

// Re-export main server types
pub use server::{PortCheckMcpServer, ToolRequest};
pub use vulnerable_server::{UncheckedToolRequest, VulnerablePortCheckMcpServer};

pub use command::{CommandSpec, ProcessRunner, ShellRunner, TokioRunner};
pub use guard::{detect_dangerous_pattern, ArgumentGuard};
pub use types::{Config, ExecError, GatewayError, ProcessOutput, ToolResult};
pub use validation::{validate_port, validate_process_id, PortValue, ProcessId};

// Re-export parameter types for direct API usage
pub use params::*;
