//! MCP Server implementation for the negative control
//!
//! Same tool names as [`crate::PortCheckMcpServer`], but every call goes
//! through [`crate::vulnerable`] and a shell. It is intentionally exploitable.

use std::sync::Arc;

use mcp_common::{async_trait, EmbeddableError, EmbeddableMcp, EmbeddableResult, McpError};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router,
};
use serde_json::Value;

use crate::command::{ShellRunner, TokioRunner};
use crate::handlers::{self, SYSTEM_INFO, WHICH_APP_ON_PORT};
use crate::params::*;
use crate::types::{Config, ToolResult};

#[derive(Debug)]
pub enum UncheckedToolRequest {
    WhichAppOnPort(UncheckedPortParams),
    SystemInfo(UncheckedSystemInfoParams),
}

impl UncheckedToolRequest {
    pub fn parse(name: &str, arguments: Value) -> EmbeddableResult<Self> {
        match name {
            WHICH_APP_ON_PORT => Ok(Self::WhichAppOnPort(serde_json::from_value(arguments)?)),
            SYSTEM_INFO => Ok(Self::SystemInfo(serde_json::from_value(arguments)?)),
            other => Err(EmbeddableError::ToolNotFound(other.to_string())),
        }
    }
}

/// The vulnerable Port Check MCP Server
#[derive(Clone)]
pub struct VulnerablePortCheckMcpServer {
    shell: Arc<dyn ShellRunner>,
    config: Config,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl VulnerablePortCheckMcpServer {
    pub fn new() -> Self {
        Self::with_config(Config::load())
    }

    pub fn with_config(config: Config) -> Self {
        let shell = Arc::new(TokioRunner::new(&config));
        Self::with_shell(config, shell)
    }

    pub fn with_shell(config: Config, shell: Arc<dyn ShellRunner>) -> Self {
        Self {
            shell,
            config,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn dispatch(&self, request: UncheckedToolRequest) -> ToolResult {
        match request {
            UncheckedToolRequest::WhichAppOnPort(params) => {
                handlers::which_app_on_port_unchecked(
                    self.shell.as_ref(),
                    &self.config.commands,
                    params,
                )
                .await
            }
            UncheckedToolRequest::SystemInfo(params) => {
                handlers::system_info_unchecked(self.shell.as_ref(), params).await
            }
        }
    }

    #[tool(
        name = "which-app-on-port",
        description = "Check which application is running on a given port (VULNERABLE to command injection)"
    )]
    async fn which_app_on_port(
        &self,
        Parameters(params): Parameters<UncheckedPortParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .dispatch(UncheckedToolRequest::WhichAppOnPort(params))
            .await
            .into_call_result())
    }

    #[tool(
        name = "system-info",
        description = "Run a system command (VULNERABLE: executes any command through the shell)"
    )]
    async fn system_info(
        &self,
        Parameters(params): Parameters<UncheckedSystemInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .dispatch(UncheckedToolRequest::SystemInfo(params))
            .await
            .into_call_result())
    }
}

#[tool_handler]
impl rmcp::ServerHandler for VulnerablePortCheckMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "INTENTIONALLY VULNERABLE port checker for injection demos. \
                 Inputs are interpolated into shell command lines."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl EmbeddableMcp for VulnerablePortCheckMcpServer {
    fn server_name(&self) -> &str {
        "portcheck-vulnerable"
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        let request = UncheckedToolRequest::parse(name, params)?;
        Ok(self.dispatch(request).await.into_call_result())
    }
}

impl Default for VulnerablePortCheckMcpServer {
    fn default() -> Self {
        Self::new()
    }
}
