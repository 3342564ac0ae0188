//! Execution requests and outcomes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::tool::builder::CommandLine;

/// Identifier of one dispatch, unique within a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(u64);

impl ExecutionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exec-{}", self.0)
    }
}

impl From<u64> for ExecutionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Everything the supervisor needs to run one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub id: ExecutionId,
    pub command: CommandLine,
    pub timeout: Duration,
    /// Working directory; `None` inherits the caller's.
    pub working_dir: Option<PathBuf>,
}

impl ExecutionRequest {
    pub fn new(id: ExecutionId, command: CommandLine, timeout: Duration) -> Self {
        Self {
            id,
            command,
            timeout,
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Bounded capture of one output stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedStream {
    /// At most the configured cap.
    pub bytes: Vec<u8>,
    /// Set when bytes past the cap were discarded.
    pub truncated: bool,
    /// Bytes the process actually wrote, including discarded ones.
    pub total_bytes: u64,
}

impl CapturedStream {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            total_bytes: bytes.len() as u64,
            bytes,
            truncated: false,
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Raw result of one supervised process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Absent when the process was killed.
    pub exit_code: Option<i32>,
    pub stdout: CapturedStream,
    pub stderr: CapturedStream,
    pub elapsed: Duration,
    pub timed_out: bool,
    pub cancelled: bool,
}

impl ExecutionOutcome {
    pub fn truncated(&self) -> bool {
        self.stdout.truncated || self.stderr.truncated
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out && !self.cancelled
    }
}
