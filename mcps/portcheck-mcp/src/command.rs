//! Command construction and process execution primitives
//!
//! [`CommandSpec`] is the only thing [`ProcessRunner`] accepts, and it can only
//! be built after every argument passed the [`ArgumentGuard`]. The runner hands
//! the argv straight to the OS, so no argument is ever parsed as shell syntax.
//! [`ShellRunner`] exists for the negative control and nothing else.

use std::fmt;
use std::process::Stdio;

use mcp_common::async_trait;
use tokio::process::Command;

use crate::guard::ArgumentGuard;
use crate::types::{Config, ExecError, GatewayError, ProcessOutput};

/// A program and its argument vector, vetted by the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Build a spec, rejecting an empty program or any flagged argument
    pub fn build<I, S>(
        guard: &ArgumentGuard,
        program: impl Into<String>,
        args: I,
    ) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(GatewayError::InvalidArgument(
                "command name cannot be empty".to_string(),
            ));
        }
        if program.contains('\0') {
            return Err(GatewayError::InvalidArgument(format!(
                "command name {:?} contains a null byte",
                program
            )));
        }

        let args = args.into_iter().map(Into::into).collect::<Vec<String>>();
        for arg in &args {
            guard.check_argument(arg)?;
        }

        Ok(Self { program, args })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Space-joined rendering for logs only; never executed
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs a program directly with its argument vector, without a shell
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn spawn(&self, spec: &CommandSpec) -> Result<ProcessOutput, ExecError>;
}

/// Runs a whole command line through a shell
///
/// Only the vulnerable server holds one of these.
#[async_trait]
pub trait ShellRunner: Send + Sync {
    async fn spawn_shell(&self, command_line: &str) -> Result<ProcessOutput, ExecError>;
}

/// Runner backed by `tokio::process`
#[derive(Debug, Clone)]
pub struct TokioRunner {
    shell: String,
    max_output_bytes: usize,
}

impl TokioRunner {
    pub fn new(config: &Config) -> Self {
        Self {
            shell: config.commands.shell.clone(),
            max_output_bytes: config.limits.max_output_bytes,
        }
    }

    async fn run(&self, mut cmd: Command, program: &str) -> Result<ProcessOutput, ExecError> {
        // A dropped call lets the child run to completion.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false);

        let output = cmd.output().await.map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let (stdout, stdout_truncated) = truncate_output(&output.stdout, self.max_output_bytes);
        let (stderr, stderr_truncated) = truncate_output(&output.stderr, self.max_output_bytes);

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout,
            stderr,
            truncated: stdout_truncated || stderr_truncated,
        })
    }
}

#[async_trait]
impl ProcessRunner for TokioRunner {
    async fn spawn(&self, spec: &CommandSpec) -> Result<ProcessOutput, ExecError> {
        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args());
        self.run(cmd, spec.program()).await
    }
}

#[async_trait]
impl ShellRunner for TokioRunner {
    async fn spawn_shell(&self, command_line: &str) -> Result<ProcessOutput, ExecError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(command_line);
        self.run(cmd, &self.shell).await
    }
}

/// Truncate output to max bytes without splitting a character
///
/// A cut that lands inside a multi-byte sequence backs off to the previous
/// character boundary. Invalid bytes elsewhere still decode lossily.
fn truncate_output(output: &[u8], max_bytes: usize) -> (String, bool) {
    if output.len() <= max_bytes {
        return (String::from_utf8_lossy(output).to_string(), false);
    }

    let head = &output[..max_bytes];
    let end = match std::str::from_utf8(head) {
        Ok(_) => max_bytes,
        // error_len() is None only for an incomplete sequence at the very end
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => max_bytes,
    };
    (String::from_utf8_lossy(&output[..end]).to_string(), true)
}
