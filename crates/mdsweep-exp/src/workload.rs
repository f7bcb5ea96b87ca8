use std::path::PathBuf;
use std::process::Command;

use mdsweep_core::errors::{ErrorInfo, SweepError};
use mdsweep_core::ParameterTuple;
use serde::{Deserialize, Serialize};

use crate::naming::Job;

/// How the external decoding workload is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    /// Executable to run, e.g. `python`.
    pub program: String,
    /// Leading arguments placed before the tuple's named parameters.
    #[serde(default)]
    pub args: Vec<String>,
    /// Directory the workload runs in; inherits the caller's when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl WorkloadSpec {
    /// Full argv for one tuple: program, leading args, then named parameters.
    pub fn command_tokens(&self, tuple: &ParameterTuple) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.args.len() + 18);
        tokens.push(self.program.clone());
        tokens.extend(self.args.iter().cloned());
        tokens.extend(tuple.to_cli_args());
        tokens
    }
}

/// Synchronous execution of one job.
pub trait Workload {
    fn run(&mut self, job: &Job) -> Result<(), SweepError>;
}

/// Runs the workload as a child process and waits for it to exit.
#[derive(Debug, Clone)]
pub struct ProcessWorkload {
    spec: WorkloadSpec,
}

impl ProcessWorkload {
    pub fn new(spec: WorkloadSpec) -> Self {
        Self { spec }
    }
}

fn invocation_error(job: &Job, info: ErrorInfo) -> SweepError {
    SweepError::WorkloadInvocation(info.with_context("job", job.id.to_string()))
}

impl Workload for ProcessWorkload {
    fn run(&mut self, job: &Job) -> Result<(), SweepError> {
        let mut command = Command::new(&self.spec.program);
        command.args(&self.spec.args).args(job.tuple.to_cli_args());
        if let Some(dir) = &self.spec.working_dir {
            command.current_dir(dir);
        }
        let status = command.status().map_err(|err| {
            invocation_error(
                job,
                ErrorInfo::new("workload.spawn", err.to_string())
                    .with_context("program", self.spec.program.clone()),
            )
        })?;
        if status.success() {
            return Ok(());
        }
        let exit = status
            .code()
            .map(|code| code.to_string())
            .unwrap_or_else(|| "signal".to_string());
        Err(invocation_error(
            job,
            ErrorInfo::new("workload.exit", format!("workload exited with status {exit}"))
                .with_context("exit", exit),
        ))
    }
}
