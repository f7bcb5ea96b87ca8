use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use mdsweep_core::errors::{ErrorInfo, SweepError};
use serde::{Deserialize, Serialize};
use tempfile::TempPath;

use crate::naming::JobId;

/// Scheduler configuration for submission mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSpec {
    /// Command that accepts a descriptor path, e.g. `sbatch`.
    #[serde(default = "SchedulerSpec::default_submit_command")]
    pub submit_command: String,
    /// Extra arguments placed before the descriptor path.
    #[serde(default)]
    pub submit_args: Vec<String>,
    /// Directory descriptors are written to while they are submitted.
    #[serde(default = "SchedulerSpec::default_descriptor_dir")]
    pub descriptor_dir: PathBuf,
}

impl SchedulerSpec {
    fn default_submit_command() -> String {
        "sbatch".to_string()
    }

    fn default_descriptor_dir() -> PathBuf {
        PathBuf::from(".")
    }
}

impl Default for SchedulerSpec {
    fn default() -> Self {
        Self {
            submit_command: Self::default_submit_command(),
            submit_args: Vec::new(),
            descriptor_dir: Self::default_descriptor_dir(),
        }
    }
}

/// Acknowledgement returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    /// Opaque queue identifier reported by the scheduler.
    pub queue_id: String,
}

/// Hand-off of a written descriptor to a batch scheduler.
pub trait Scheduler {
    fn submit(&mut self, descriptor: &Path) -> Result<SubmitAck, SweepError>;
}

/// Submits descriptors by running an external command such as `sbatch`.
#[derive(Debug, Clone)]
pub struct CommandScheduler {
    command: String,
    args: Vec<String>,
}

impl CommandScheduler {
    pub fn new(spec: &SchedulerSpec) -> Self {
        Self {
            command: spec.submit_command.clone(),
            args: spec.submit_args.clone(),
        }
    }
}

fn submission_error(descriptor: &Path, info: ErrorInfo) -> SweepError {
    SweepError::Submission(info.with_context("descriptor", descriptor.display().to_string()))
}

impl Scheduler for CommandScheduler {
    fn submit(&mut self, descriptor: &Path) -> Result<SubmitAck, SweepError> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(descriptor)
            .output()
            .map_err(|err| {
                submission_error(
                    descriptor,
                    ErrorInfo::new("scheduler.spawn", err.to_string())
                        .with_context("command", self.command.clone()),
                )
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let exit = output
                .status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(submission_error(
                descriptor,
                ErrorInfo::new("scheduler.exit", format!("{} exited with status {exit}", self.command))
                    .with_context("stderr", stderr),
            ));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(SubmitAck {
            queue_id: parse_queue_id(&stdout),
        })
    }
}

/// Extracts the queue id from `Submitted batch job 123`-style output,
/// falling back to the trimmed text when no trailing number is present.
pub fn parse_queue_id(stdout: &str) -> String {
    let trimmed = stdout.trim();
    trimmed
        .split_whitespace()
        .last()
        .filter(|token| token.chars().all(|ch| ch.is_ascii_digit()))
        .unwrap_or(trimmed)
        .to_string()
}

/// Descriptor file owned by a single submission attempt.
///
/// Backed by a [`TempPath`], so the file is deleted on every exit path
/// (early returns and unwinding included) unless [`ScopedDescriptor::remove`]
/// already took care of it.
#[derive(Debug)]
pub struct ScopedDescriptor {
    path: TempPath,
}

impl ScopedDescriptor {
    /// Writes `contents` to `{dir}/{job_id}.sh`.
    pub fn write(dir: &Path, job_id: &JobId, contents: &str) -> Result<Self, SweepError> {
        let target = dir.join(format!("{job_id}.sh"));
        let write_error = |err: std::io::Error| {
            SweepError::DescriptorWrite(
                ErrorInfo::new("descriptor.write", err.to_string())
                    .with_context("job", job_id.to_string())
                    .with_context("path", target.display().to_string()),
            )
        };
        fs::create_dir_all(dir).map_err(write_error)?;
        // owned before the write so a partial file is cleaned up too
        let path = TempPath::from_path(target.clone());
        fs::write(&path, contents).map_err(write_error)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the descriptor now, reporting any filesystem error.
    pub fn remove(self) -> Result<(), SweepError> {
        let shown = self.path.display().to_string();
        self.path.close().map_err(|err| {
            SweepError::DescriptorWrite(
                ErrorInfo::new("descriptor.remove", err.to_string()).with_context("path", shown),
            )
        })
    }
}
