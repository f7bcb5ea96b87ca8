//! Structured error types shared across mdsweep crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SweepError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (job ids, paths, exit codes).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the operator resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the sweep orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SweepError {
    /// Malformed start/end/step triple on a generated axis.
    #[error("invalid range: {0}")]
    InvalidRange(ErrorInfo),
    /// Sweep plan failed validation.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Workload process could not be started or exited non-zero.
    #[error("workload invocation failed: {0}")]
    WorkloadInvocation(ErrorInfo),
    /// Scheduler rejected the descriptor or could not be reached.
    #[error("submission failed: {0}")]
    Submission(ErrorInfo),
    /// Job descriptor could not be written to disk.
    #[error("descriptor write failed: {0}")]
    DescriptorWrite(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SweepError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SweepError::InvalidRange(info)
            | SweepError::Config(info)
            | SweepError::WorkloadInvocation(info)
            | SweepError::Submission(info)
            | SweepError::DescriptorWrite(info)
            | SweepError::Serde(info) => info,
        }
    }

    /// Configuration-time errors abort the sweep before any dispatch.
    /// Per-job errors are recorded and the sweep moves on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SweepError::InvalidRange(_) | SweepError::Config(_) | SweepError::Serde(_)
        )
    }

    /// Short stable name of the error family, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SweepError::InvalidRange(_) => "invalid-range",
            SweepError::Config(_) => "config",
            SweepError::WorkloadInvocation(_) => "workload-invocation",
            SweepError::Submission(_) => "submission",
            SweepError::DescriptorWrite(_) => "descriptor-write",
            SweepError::Serde(_) => "serde",
        }
    }
}
