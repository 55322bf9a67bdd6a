//! Negative control: the same lookup built by string substitution
//!
//! Raw input is pasted into a command line and handed to `sh -c`. There is no
//! grammar check, no denylist and no argv isolation. This exists so tests can
//! show what the hardened gateway prevents. Do not reuse it.

use serde::Serialize;

use crate::command::{CommandSpec, ProcessRunner, ShellRunner};
use crate::guard::ArgumentGuard;
use crate::lookup::{OwnerRecord, PortOwner};
use crate::types::{CommandConfig, ExecError, GatewayError, ProcessOutput};

/// Port lookup with the raw port and the raw PID interpolated into `sh -c`
pub async fn lookup_port_owner_unchecked(
    shell: &dyn ShellRunner,
    commands: &CommandConfig,
    raw_port: &str,
) -> Result<PortOwner, ExecError> {
    let line = format!("{} -t -i tcp:{}", commands.lsof, raw_port);
    tracing::warn!(variant = "vulnerable", command = %line, "Executing command");

    let output = shell.spawn_shell(&line).await?;
    if output.exit_code == Some(1) && output.stdout.trim().is_empty() {
        return Ok(PortOwner::NoOwner);
    }
    let output = output.into_success(&line)?;

    let pid = output.stdout.trim();
    if pid.is_empty() {
        return Ok(PortOwner::NoOwner);
    }

    // Chained: whatever stage 1 printed becomes part of the next line.
    let line = format!("{} -p {} -o comm=", commands.ps, pid);
    tracing::warn!(variant = "vulnerable", command = %line, "Executing command");

    let output = shell.spawn_shell(&line).await?.into_success(&line)?;

    Ok(PortOwner::Found(OwnerRecord {
        pid: pid.to_string(),
        process: output.stdout.trim().to_string(),
    }))
}

/// Run a free-form command line through the shell
pub async fn run_command_unchecked(
    shell: &dyn ShellRunner,
    command_line: &str,
) -> Result<ProcessOutput, ExecError> {
    tracing::warn!(variant = "vulnerable", command = %command_line, "Executing command");
    shell.spawn_shell(command_line).await?.into_success(command_line)
}

/// Outcome of one side of [`compare_execution`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutcome {
    fn from_result<E: std::fmt::Display>(result: Result<ProcessOutput, E>) -> Self {
        match result {
            Ok(output) => Self {
                success: true,
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Err(e) => Self {
                success: false,
                stdout: String::new(),
                stderr: e.to_string(),
            },
        }
    }
}

/// The same invocation run joined through the shell and as a vetted argv
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionComparison {
    pub vulnerable: ExecutionOutcome,
    pub secure: ExecutionOutcome,
}

/// Run `program args..` both ways and report what each did
pub async fn compare_execution<R>(
    runner: &R,
    guard: &ArgumentGuard,
    program: &str,
    args: &[&str],
) -> ExecutionComparison
where
    R: ProcessRunner + ShellRunner,
{
    let joined = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    let vulnerable = run_command_unchecked(runner, &joined).await;

    let secure = run_vetted(runner, guard, program, args).await;

    ExecutionComparison {
        vulnerable: ExecutionOutcome::from_result(vulnerable),
        secure: ExecutionOutcome::from_result(secure),
    }
}

async fn run_vetted(
    runner: &dyn ProcessRunner,
    guard: &ArgumentGuard,
    program: &str,
    args: &[&str],
) -> Result<ProcessOutput, GatewayError> {
    let spec = CommandSpec::build(guard, program, args.iter().copied())?;
    tracing::info!(variant = "secure", command = %spec, "Executing command");

    let output = runner.spawn(&spec).await?.into_success(spec.program())?;
    Ok(output)
}
