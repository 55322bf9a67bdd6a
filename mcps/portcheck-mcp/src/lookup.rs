//! Port-owner lookup through two independently guarded stages
//!
//! 1. `lsof -t -i tcp:<port>` resolves the owning PID.
//! 2. The PID is re-validated, then `ps -p <pid> -o comm=` resolves its name.
//!
//! Stage 2 runs only after stage 1 finished and its output passed the PID
//! grammar. Nothing is retried.

use serde::Serialize;

use crate::command::{CommandSpec, ProcessRunner};
use crate::guard::ArgumentGuard;
use crate::types::{CommandConfig, GatewayError};
use crate::validation::{validate_process_id, PortValue};

/// Process found listening on a port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerRecord {
    pub pid: String,
    pub process: String,
}

/// Terminal state of a successful lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PortOwner {
    NoOwner,
    Found(OwnerRecord),
}

/// lsof exits 1 without output when nothing matches the filter
fn is_lsof_no_match(exit_code: Option<i32>, stdout: &str) -> bool {
    exit_code == Some(1) && stdout.trim().is_empty()
}

/// Validated gateway for "which process owns this port"
pub struct PortOwnerLookup<'a> {
    runner: &'a dyn ProcessRunner,
    guard: &'a ArgumentGuard,
    commands: &'a CommandConfig,
}

impl<'a> PortOwnerLookup<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        guard: &'a ArgumentGuard,
        commands: &'a CommandConfig,
    ) -> Self {
        Self {
            runner,
            guard,
            commands,
        }
    }

    pub async fn lookup(&self, port: PortValue) -> Result<PortOwner, GatewayError> {
        let Some(raw_pid) = self.resolve_pid(port).await? else {
            return Ok(PortOwner::NoOwner);
        };

        // The PID came from another program's stdout; re-check it.
        let pid = validate_process_id(&raw_pid)?;

        let process = self.resolve_process_name(pid.as_str()).await?;

        Ok(PortOwner::Found(OwnerRecord {
            pid: pid.into_string(),
            process,
        }))
    }

    async fn resolve_pid(&self, port: PortValue) -> Result<Option<String>, GatewayError> {
        let spec = CommandSpec::build(
            self.guard,
            self.commands.lsof.as_str(),
            ["-t".to_string(), "-i".to_string(), port.tcp_filter()],
        )?;
        tracing::debug!(command = %spec, "Resolving port owner");

        let output = self.runner.spawn(&spec).await?;
        if is_lsof_no_match(output.exit_code, &output.stdout) {
            return Ok(None);
        }

        let output = output.into_success(spec.program())?;
        let pid = output.stdout.trim();
        if pid.is_empty() {
            Ok(None)
        } else {
            Ok(Some(pid.to_string()))
        }
    }

    async fn resolve_process_name(&self, pid: &str) -> Result<String, GatewayError> {
        let spec = CommandSpec::build(
            self.guard,
            self.commands.ps.as_str(),
            ["-p", pid, "-o", "comm="],
        )?;
        tracing::debug!(command = %spec, "Resolving process name");

        let output = self
            .runner
            .spawn(&spec)
            .await?
            .into_success(spec.program())?;

        Ok(output.stdout.trim().to_string())
    }
}
