//! Tool handlers
//!
//! Every handler returns a [`ToolResult`]. Rejections and failures become
//! error results with a readable reason; nothing is raised to the transport
//! and nothing is retried.

use crate::command::{CommandSpec, ProcessRunner, ShellRunner};
use crate::guard::ArgumentGuard;
use crate::lookup::{OwnerRecord, PortOwner, PortOwnerLookup};
use crate::params::*;
use crate::types::{CommandConfig, GatewayError, ProcessOutput, ToolResult};
use crate::validation::validate_port;
use crate::vulnerable;

pub const WHICH_APP_ON_PORT: &str = "which-app-on-port";
pub const SYSTEM_INFO: &str = "system-info";

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a gateway error: rejections at warn, execution failures at error
fn log_gateway_error(tool: &str, err: &GatewayError) {
    let (message, detail) = match err {
        GatewayError::InvalidPort(raw) => ("Invalid port rejected", raw.clone()),
        GatewayError::InvalidProcessId(raw) => ("Invalid PID rejected", raw.clone()),
        GatewayError::InvalidArgument(reason) => ("Command argument rejected", reason.clone()),
        GatewayError::ExecutionFailure(e) => ("Command execution failed", e.to_string()),
    };

    if err.is_rejection() {
        tracing::warn!(variant = "secure", tool, %detail, "{}", message);
    } else {
        tracing::error!(variant = "secure", tool, %detail, "{}", message);
    }
}

/// Text for a validation rejection, naming the tool that refused the input
fn describe_rejection(tool: &str, err: &GatewayError) -> String {
    format!("Error: {}: {}", tool, err)
}

fn describe_owner(port: impl std::fmt::Display, owner: &PortOwner) -> String {
    match owner {
        PortOwner::NoOwner => format!("No application found running on port {}", port),
        PortOwner::Found(OwnerRecord { pid, process }) => format!(
            "Application running on port {}:\n- Process: {}\n- PID: {}",
            port, process, pid
        ),
    }
}

fn describe_output(output: &ProcessOutput) -> String {
    let mut text = format!("Command output:\n{}", output.stdout);
    if !output.stderr.is_empty() {
        text.push_str("\nErrors:\n");
        text.push_str(&output.stderr);
    }
    if output.truncated {
        text.push_str("\n(output truncated)");
    }
    text
}

// ============================================================================
// Hardened Handlers
// ============================================================================

pub async fn which_app_on_port(
    runner: &dyn ProcessRunner,
    guard: &ArgumentGuard,
    commands: &CommandConfig,
    params: WhichAppOnPortParams,
) -> ToolResult {
    tracing::info!(variant = "secure", port = %params.port, "Checking port");

    let port = match validate_port(&params.port) {
        Ok(port) => port,
        Err(e) => {
            log_gateway_error(WHICH_APP_ON_PORT, &e);
            return ToolResult::failure(describe_rejection(WHICH_APP_ON_PORT, &e));
        }
    };

    match PortOwnerLookup::new(runner, guard, commands).lookup(port).await {
        Ok(owner) => {
            if let PortOwner::Found(record) = &owner {
                tracing::info!(
                    variant = "secure",
                    port = port.get(),
                    pid = %record.pid,
                    process = %record.process,
                    "Found process"
                );
            }
            ToolResult::ok(describe_owner(port, &owner))
        }
        Err(e) => {
            log_gateway_error(WHICH_APP_ON_PORT, &e);
            match e {
                GatewayError::ExecutionFailure(_) => {
                    ToolResult::failure(format!("Error checking port {}: {}", port, e))
                }
                _ => ToolResult::failure(format!("Error: {}", e)),
            }
        }
    }
}

pub async fn system_info(
    runner: &dyn ProcessRunner,
    guard: &ArgumentGuard,
    params: SystemInfoParams,
) -> ToolResult {
    tracing::info!(variant = "secure", operation = ?params.operation, "Running system query");

    let (program, args) = params.operation.argv();
    let result = async {
        let spec = CommandSpec::build(guard, program, args.iter().copied())?;
        let output = runner.spawn(&spec).await?.into_success(spec.program())?;
        Ok::<_, GatewayError>(output)
    }
    .await;

    match result {
        Ok(output) => ToolResult::ok(describe_output(&output)),
        Err(e) => {
            log_gateway_error(SYSTEM_INFO, &e);
            match e {
                GatewayError::ExecutionFailure(_) => {
                    ToolResult::failure(format!("Error executing command: {}", e))
                }
                _ => ToolResult::failure(describe_rejection(SYSTEM_INFO, &e)),
            }
        }
    }
}

// ============================================================================
// Negative Control Handlers
// ============================================================================

pub async fn which_app_on_port_unchecked(
    shell: &dyn ShellRunner,
    commands: &CommandConfig,
    params: UncheckedPortParams,
) -> ToolResult {
    tracing::info!(variant = "vulnerable", port = %params.port, "Checking port");

    match vulnerable::lookup_port_owner_unchecked(shell, commands, &params.port).await {
        Ok(owner) => ToolResult::ok(describe_owner(&params.port, &owner)),
        Err(e) => {
            tracing::error!(variant = "vulnerable", port = %params.port, error = %e, "Port check failed");
            ToolResult::failure(format!("Error checking port {}: {}", params.port, e))
        }
    }
}

pub async fn system_info_unchecked(
    shell: &dyn ShellRunner,
    params: UncheckedSystemInfoParams,
) -> ToolResult {
    match vulnerable::run_command_unchecked(shell, &params.command).await {
        Ok(output) => ToolResult::ok(describe_output(&output)),
        Err(e) => {
            tracing::error!(variant = "vulnerable", command = %params.command, error = %e, "Command failed");
            ToolResult::failure(format!("Error executing command: {}", e))
        }
    }
}
