//! Type definitions for portcheck MCP

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Configuration shared by the hardened and the vulnerable server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub commands: CommandConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load config from standard file locations
    ///
    /// Config is searched in order:
    /// 1. `PORTCHECK_CONFIG_PATH` env var
    /// 2. `./portcheck-mcp.toml`
    /// 3. `$XDG_CONFIG_HOME/portcheck-mcp/config.toml`
    /// 4. `~/.portcheck-mcp.toml`
    /// 5. Default config if none found
    pub fn load() -> Self {
        if let Ok(env_path) = std::env::var("PORTCHECK_CONFIG_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                if let Some(config) = Self::read(&path) {
                    return config;
                }
            } else {
                tracing::warn!("PORTCHECK_CONFIG_PATH={} does not exist", env_path);
            }
        }

        let mut config_paths = vec![PathBuf::from("portcheck-mcp.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("portcheck-mcp").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            config_paths.push(home.join(".portcheck-mcp.toml"));
        }

        for path in config_paths {
            if path.exists() {
                if let Some(config) = Self::read(&path) {
                    return config;
                }
            }
        }

        tracing::info!("Using default configuration");
        Config::default()
    }

    fn read(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                return None;
            }
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Program used to resolve a port to its owning PID
    #[serde(default = "default_lsof")]
    pub lsof: String,

    /// Program used to resolve a PID to its command name
    #[serde(default = "default_ps")]
    pub ps: String,

    /// Shell used by the vulnerable server only
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_lsof() -> String {
    "lsof".to_string()
}

fn default_ps() -> String {
    "ps".to_string()
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            lsof: default_lsof(),
            ps: default_ps(),
            shell: default_shell(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Regex patterns appended to the built-in argument denylist
    #[serde(default)]
    pub extra_deny_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum captured size per stream (stdout/stderr) in bytes
    #[serde(default = "default_max_output")]
    pub max_output_bytes: usize,
}

fn default_max_output() -> usize {
    64 * 1024
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_output_bytes: default_max_output(),
        }
    }
}

// ============================================================================
// Process Output
// ============================================================================

/// Captured result of one child process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub truncated: bool,
}

impl ProcessOutput {
    /// Output of a process that exited cleanly with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    /// Output of a process that exited with `code` and the given stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn a non-zero exit into an [`ExecError`]
    pub fn into_success(self, program: &str) -> Result<Self, ExecError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ExecError::NonZeroExit {
                program: program.to_string(),
                code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

// ============================================================================
// Tool Result
// ============================================================================

/// User-facing outcome of one tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub text: String,
}

impl ToolResult {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            success: false,
            text: text.into(),
        }
    }

    pub fn into_call_result(self) -> mcp_common::CallToolResult {
        if self.success {
            mcp_common::text_success(self.text)
        } else {
            mcp_common::text_error(self.text)
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while spawning or configuring child processes
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {} exited with {}{}", .program, exit_label(.code), stderr_suffix(.stderr))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Config error: {0}")]
    ConfigError(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Rejections and failures of the validated gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Port failed its grammar; carries a debug rendering of the raw input
    #[error("Invalid port number. Port must be a number between 1 and 65535.")]
    InvalidPort(String),

    /// PID produced by the lookup stage failed its grammar
    #[error("Invalid process ID returned from system.")]
    InvalidProcessId(String),

    #[error("Invalid command argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    ExecutionFailure(#[from] ExecError),
}

impl GatewayError {
    /// Validation rejections, as opposed to execution failures
    pub fn is_rejection(&self) -> bool {
        !matches!(self, GatewayError::ExecutionFailure(_))
    }
}
