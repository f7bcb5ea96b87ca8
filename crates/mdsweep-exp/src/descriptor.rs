use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use mdsweep_core::errors::{ErrorInfo, SweepError};
use serde::{Deserialize, Serialize};

use crate::naming::Job;
use crate::workload::WorkloadSpec;

/// Scheduler token replaced by the run identifier the scheduler assigns.
pub const RUN_ID_TOKEN: &str = "%j";

fn config_error(code: &str, message: impl Into<String>) -> SweepError {
    SweepError::Config(ErrorInfo::new(code, message))
}

/// Wall-clock limit in whole seconds.
///
/// Parses the Slurm forms `M`, `M:S`, `H:M:S`, `D-H`, `D-H:M` and `D-H:M:S`
/// and renders `HH:MM:SS`, prefixed with `D-` when the limit spans days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime {
    seconds: u64,
}

impl WallTime {
    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn as_secs(&self) -> u64 {
        self.seconds
    }
}

impl FromStr for WallTime {
    type Err = SweepError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            SweepError::Config(
                ErrorInfo::new("resources.time", "malformed wall time")
                    .with_context("time", input.to_string())
                    .with_hint("use HH:MM:SS or D-HH:MM:SS"),
            )
        };
        let parse = |part: &str| part.trim().parse::<u64>().map_err(|_| malformed());
        let (days, clock) = match input.split_once('-') {
            Some((days, clock)) => (Some(parse(days)?), clock),
            None => (None, input),
        };
        let fields = clock
            .split(':')
            .map(parse)
            .collect::<Result<Vec<_>, _>>()?;
        let (hours, minutes, seconds) = match (days.is_some(), fields.as_slice()) {
            (false, [m]) => (0, *m, 0),
            (false, [m, s]) => (0, *m, *s),
            (_, [h, m, s]) => (*h, *m, *s),
            (true, [h]) => (*h, 0, 0),
            (true, [h, m]) => (*h, *m, 0),
            _ => return Err(malformed()),
        };
        let total = [(days.unwrap_or(0), 86_400), (hours, 3_600), (minutes, 60), (seconds, 1)]
            .into_iter()
            .try_fold(0u64, |acc, (count, unit)| {
                count.checked_mul(unit).and_then(|secs| acc.checked_add(secs))
            })
            .ok_or_else(malformed)?;
        if total == 0 {
            return Err(SweepError::Config(
                ErrorInfo::new("resources.time", "wall time must be positive")
                    .with_context("time", input.to_string()),
            ));
        }
        Ok(Self { seconds: total })
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.seconds / 86_400;
        let hours = (self.seconds % 86_400) / 3_600;
        let minutes = (self.seconds % 3_600) / 60;
        let seconds = self.seconds % 60;
        if days > 0 {
            write!(f, "{days}-")?;
        }
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl Serialize for WallTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Resource request shared by every submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePlan {
    /// Wall-clock limit per job.
    pub time: WallTime,
    /// CPU cores per task.
    pub cpus: u32,
    /// Memory request, e.g. `16G`.
    pub mem: String,
    /// Allocation account charged for the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Directory receiving `{job_id}_%j.out` logs.
    #[serde(default = "ResourcePlan::default_log_dir")]
    pub log_dir: PathBuf,
    /// Shell lines run before the workload (module loads, venv activation).
    #[serde(default)]
    pub setup: Vec<String>,
    /// Variables exported before the workload starts.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl ResourcePlan {
    fn default_log_dir() -> PathBuf {
        PathBuf::from("logs")
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if self.cpus == 0 {
            return Err(config_error("resources.cpus", "cpus must be positive"));
        }
        if !is_memory_size(&self.mem) {
            return Err(SweepError::Config(
                ErrorInfo::new("resources.mem", "malformed memory request")
                    .with_context("mem", self.mem.clone())
                    .with_hint("use an integer with an optional K, M, G or T suffix"),
            ));
        }
        if self.log_dir.to_string_lossy().contains(char::is_whitespace) {
            return Err(SweepError::Config(
                ErrorInfo::new("resources.log_dir", "log directory must not contain whitespace")
                    .with_context("log_dir", self.log_dir.display().to_string()),
            ));
        }
        if let Some(account) = &self.account {
            if account.trim().is_empty() || account.contains(char::is_whitespace) {
                return Err(config_error("resources.account", "account must be a single word"));
            }
        }
        for key in self.environment.keys() {
            let valid = key
                .chars()
                .next()
                .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_')
                && key.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            if !valid {
                return Err(SweepError::Config(
                    ErrorInfo::new("resources.environment", "invalid variable name")
                        .with_context("name", key.clone()),
                ));
            }
        }
        Ok(())
    }
}

fn is_memory_size(mem: &str) -> bool {
    let digits_end = mem
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(mem.len());
    if digits_end == 0 || mem[..digits_end].bytes().all(|b| b == b'0') {
        return false;
    }
    let suffix = mem[digits_end..].to_ascii_uppercase();
    matches!(
        suffix.as_str(),
        "" | "K" | "M" | "G" | "T" | "KB" | "MB" | "GB" | "TB"
    )
}

/// One `#SBATCH --key=value` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub key: String,
    pub value: String,
}

impl Directive {
    fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

/// Batch script for one job: resource directives plus a single command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub job_id: String,
    pub directives: Vec<Directive>,
    pub setup: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub working_dir: Option<PathBuf>,
    pub command: Vec<String>,
}

impl JobDescriptor {
    /// The workload invocation as one shell-quoted line.
    pub fn command_line(&self) -> String {
        join_quoted(&self.command)
    }

    /// Renders the descriptor as a bash batch script.
    pub fn render(&self) -> String {
        let mut out = String::from("#!/bin/bash\n");
        for directive in &self.directives {
            out.push_str(&format!("#SBATCH --{}={}\n", directive.key, directive.value));
        }
        out.push_str("\nset -euo pipefail\n");
        if !self.setup.is_empty() {
            out.push('\n');
            for line in &self.setup {
                out.push_str(line);
                out.push('\n');
            }
        }
        if !self.environment.is_empty() {
            out.push('\n');
            for (key, value) in &self.environment {
                out.push_str(&format!("export {key}={}\n", shell_quote(value)));
            }
        }
        out.push('\n');
        if let Some(dir) = &self.working_dir {
            out.push_str(&format!("cd {}\n", shell_quote(&dir.to_string_lossy())));
        }
        out.push_str(&self.command_line());
        out.push('\n');
        out
    }
}

/// Builds the batch descriptor for `job`.
///
/// Resource directives depend only on `resources` and the job id; the tuple
/// enters through the job name, the log path and the command line.
pub fn build_descriptor(job: &Job, resources: &ResourcePlan, workload: &WorkloadSpec) -> JobDescriptor {
    let output = resources
        .log_dir
        .join(format!("{}_{RUN_ID_TOKEN}.out", job.id));
    let mut directives = vec![
        Directive::new("job-name", job.id.to_string()),
        Directive::new("time", resources.time.to_string()),
        Directive::new("cpus-per-task", resources.cpus.to_string()),
        Directive::new("mem", resources.mem.clone()),
    ];
    if let Some(account) = &resources.account {
        directives.push(Directive::new("account", account.clone()));
    }
    directives.push(Directive::new("output", output.to_string_lossy()));
    JobDescriptor {
        job_id: job.id.to_string(),
        directives,
        setup: resources.setup.clone(),
        environment: resources.environment.clone(),
        working_dir: workload.working_dir.clone(),
        command: workload.command_tokens(&job.tuple),
    }
}

/// Quotes `raw` for a POSIX shell unless it only holds safe characters.
pub fn shell_quote(raw: &str) -> Cow<'_, str> {
    let safe = !raw.is_empty()
        && raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_./:=+,%@".contains(ch));
    if safe {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("'{}'", raw.replace('\'', "'\\''")))
    }
}

pub fn join_quoted(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| shell_quote(token))
        .collect::<Vec<_>>()
        .join(" ")
}
