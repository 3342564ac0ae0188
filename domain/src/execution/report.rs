//! Caller-facing execution report.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::request::ExecutionId;

/// Tool-specific derived facts (e.g. `discovered_count`).
pub type Extras = BTreeMap<String, Value>;

/// Machine-checkable reason a report is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    UnknownTool,
    MissingParameter,
    TypeMismatch,
    InvalidParameter,
    ProcessNotFound,
    NonZeroExit,
    TimedOut,
    Cancelled,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::UnknownTool => "UnknownTool",
            FailureReason::MissingParameter => "MissingParameter",
            FailureReason::TypeMismatch => "TypeMismatch",
            FailureReason::InvalidParameter => "InvalidParameter",
            FailureReason::ProcessNotFound => "ProcessNotFound",
            FailureReason::NonZeroExit => "NonZeroExit",
            FailureReason::TimedOut => "TimedOut",
            FailureReason::Cancelled => "Cancelled",
        }
    }

    /// Raised before any process was started.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FailureReason::UnknownTool
                | FailureReason::MissingParameter
                | FailureReason::TypeMismatch
                | FailureReason::InvalidParameter
        )
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal degradations attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReportWarning {
    #[serde(rename_all = "camelCase")]
    OutputTruncated {
        stream: String,
        captured_bytes: u64,
        total_bytes: u64,
    },
    #[serde(rename_all = "camelCase")]
    ArtifactUnavailable { detail: String },
}

impl std::fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportWarning::OutputTruncated {
                stream,
                captured_bytes,
                total_bytes,
            } => write!(
                f,
                "{} truncated: kept {} of {} bytes",
                stream, captured_bytes, total_bytes
            ),
            ReportWarning::ArtifactUnavailable { detail } => {
                write!(f, "artifact unavailable: {}", detail)
            }
        }
    }
}

/// Normalized outcome of running one tool once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub tool_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<ExecutionId>,
    pub success: bool,
    pub summary: String,
    #[serde(default)]
    pub failure_reason: Option<FailureReason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ReportWarning>,
    #[serde(default)]
    pub extras: Extras,
    #[serde(default)]
    pub raw_output: String,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub duration_ms: u64,
    /// Rendered command line, for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl ExecutionReport {
    pub fn success(tool_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
            execution_id: None,
            success: true,
            summary: summary.into(),
            failure_reason: None,
            warnings: Vec::new(),
            extras: Extras::new(),
            raw_output: String::new(),
            truncated: false,
            exit_code: None,
            duration_ms: 0,
            command: None,
        }
    }

    pub fn failure(
        tool_id: impl Into<String>,
        reason: FailureReason,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            failure_reason: Some(reason),
            ..Self::success(tool_id, summary)
        }
    }

    pub fn with_execution_id(mut self, id: ExecutionId) -> Self {
        self.execution_id = Some(id);
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn has_warning(&self, predicate: impl Fn(&ReportWarning) -> bool) -> bool {
        self.warnings.iter().any(predicate)
    }
}
