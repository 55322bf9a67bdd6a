//! Parameter types for portcheck MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WhichAppOnPortParams {
    /// Kept as raw JSON so the handler, not the transport, decides what a port is
    #[schemars(with = "String", description = "Port number to check (1-65535)")]
    #[serde(default)]
    pub port: Value,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SystemInfoParams {
    #[schemars(description = "Which pre-approved system query to run")]
    pub operation: SystemQuery,
}

/// Closed set of system queries, each mapped to a fixed argv
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SystemQuery {
    /// `hostname`
    Hostname,
    /// `uname -a`
    Kernel,
    /// `uptime`
    Uptime,
    /// `id -un`
    CurrentUser,
    /// `df -h`
    DiskUsage,
}

impl SystemQuery {
    pub const ALL: [SystemQuery; 5] = [
        SystemQuery::Hostname,
        SystemQuery::Kernel,
        SystemQuery::Uptime,
        SystemQuery::CurrentUser,
        SystemQuery::DiskUsage,
    ];

    pub fn argv(self) -> (&'static str, &'static [&'static str]) {
        match self {
            SystemQuery::Hostname => ("hostname", &[]),
            SystemQuery::Kernel => ("uname", &["-a"]),
            SystemQuery::Uptime => ("uptime", &[]),
            SystemQuery::CurrentUser => ("id", &["-un"]),
            SystemQuery::DiskUsage => ("df", &["-h"]),
        }
    }
}

// ============================================================================
// Negative control parameters
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UncheckedPortParams {
    #[schemars(description = "Port number to check (accepts any string)")]
    pub port: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UncheckedSystemInfoParams {
    #[schemars(description = "System command to run (accepts any command)")]
    pub command: String,
}
