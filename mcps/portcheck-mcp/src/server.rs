//! MCP Server implementation for the hardened port checker
//!
//! Tool calls are parsed into a closed [`ToolRequest`] and dispatched by an
//! exhaustive match. Handler implementations are in the handlers module.

use std::sync::Arc;

use mcp_common::{async_trait, EmbeddableError, EmbeddableMcp, EmbeddableResult, McpError};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router,
};
use serde_json::Value;

use crate::command::{ProcessRunner, TokioRunner};
use crate::guard::ArgumentGuard;
use crate::handlers::{self, SYSTEM_INFO, WHICH_APP_ON_PORT};
use crate::params::*;
use crate::types::{Config, ExecError, ToolResult};

/// One variant per tool, each with its own typed arguments
#[derive(Debug)]
pub enum ToolRequest {
    WhichAppOnPort(WhichAppOnPortParams),
    SystemInfo(SystemInfoParams),
}

impl ToolRequest {
    /// Parse a transport-level `(name, arguments)` pair
    pub fn parse(name: &str, arguments: Value) -> EmbeddableResult<Self> {
        match name {
            WHICH_APP_ON_PORT => Ok(Self::WhichAppOnPort(serde_json::from_value(arguments)?)),
            SYSTEM_INFO => Ok(Self::SystemInfo(serde_json::from_value(arguments)?)),
            other => Err(EmbeddableError::ToolNotFound(other.to_string())),
        }
    }
}

/// The hardened Port Check MCP Server
#[derive(Clone)]
pub struct PortCheckMcpServer {
    runner: Arc<dyn ProcessRunner>,
    guard: ArgumentGuard,
    config: Config,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router - Each tool delegates to its handler
// ============================================================================

#[tool_router]
impl PortCheckMcpServer {
    /// Create a new server, loading config from standard locations
    ///
    /// Falls back to the built-in denylist if configured extra patterns do
    /// not compile.
    pub fn new() -> Self {
        let config = Config::load();
        let runner = Arc::new(TokioRunner::new(&config));

        match Self::with_runner(config.clone(), runner.clone()) {
            Ok(server) => server,
            Err(e) => {
                tracing::error!("{}; using built-in deny patterns only", e);
                Self::from_parts(config, ArgumentGuard::builtin(), runner)
            }
        }
    }

    /// Create a new server with explicit config
    pub fn with_config(config: Config) -> Result<Self, ExecError> {
        let runner = Arc::new(TokioRunner::new(&config));
        Self::with_runner(config, runner)
    }

    /// Create a new server with explicit config and process runner
    pub fn with_runner(config: Config, runner: Arc<dyn ProcessRunner>) -> Result<Self, ExecError> {
        let guard = ArgumentGuard::new(&config.guard)?;
        Ok(Self::from_parts(config, guard, runner))
    }

    fn from_parts(config: Config, guard: ArgumentGuard, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            guard,
            config,
            tool_router: Self::tool_router(),
        }
    }

    /// Handle one parsed request
    pub async fn dispatch(&self, request: ToolRequest) -> ToolResult {
        match request {
            ToolRequest::WhichAppOnPort(params) => {
                handlers::which_app_on_port(
                    self.runner.as_ref(),
                    &self.guard,
                    &self.config.commands,
                    params,
                )
                .await
            }
            ToolRequest::SystemInfo(params) => {
                handlers::system_info(self.runner.as_ref(), &self.guard, params).await
            }
        }
    }

    #[tool(
        name = "which-app-on-port",
        description = "Check which application is running on a given TCP port. The port is validated before any process is started."
    )]
    async fn which_app_on_port(
        &self,
        Parameters(params): Parameters<WhichAppOnPortParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .dispatch(ToolRequest::WhichAppOnPort(params))
            .await
            .into_call_result())
    }

    #[tool(
        name = "system-info",
        description = "Run one pre-approved system query: hostname, kernel, uptime, current-user or disk-usage"
    )]
    async fn system_info(
        &self,
        Parameters(params): Parameters<SystemInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .dispatch(ToolRequest::SystemInfo(params))
            .await
            .into_call_result())
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for PortCheckMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Port checker MCP server. Ports are validated against a strict integer \
                 grammar and lookups run as argument vectors, never through a shell. \
                 system-info only runs a fixed set of queries."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl EmbeddableMcp for PortCheckMcpServer {
    fn server_name(&self) -> &str {
        "portcheck"
    }

    fn server_description(&self) -> Option<&str> {
        Some("Hardened port-owner lookup with validated argv execution")
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        let request = ToolRequest::parse(name, params)?;
        Ok(self.dispatch(request).await.into_call_result())
    }
}

impl Default for PortCheckMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

