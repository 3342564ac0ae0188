//! Dispatch configuration from TOML (`[dispatch]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [dispatch]
//! output_cap_bytes = 1048576   # per stream
//! kill_grace_ms = 2000         # SIGTERM -> SIGKILL
//! working_dir = "/srv/scans"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::process::{DEFAULT_KILL_GRACE, DEFAULT_OUTPUT_CAP, SupervisorSettings};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Capture cap for each of stdout and stderr
    pub output_cap_bytes: usize,
    /// Grace period between SIGTERM and SIGKILL
    pub kill_grace_ms: u64,
    /// Working directory for tool processes
    pub working_dir: Option<PathBuf>,
}

impl Default for FileDispatchConfig {
    fn default() -> Self {
        Self {
            output_cap_bytes: DEFAULT_OUTPUT_CAP,
            kill_grace_ms: DEFAULT_KILL_GRACE.as_millis() as u64,
            working_dir: None,
        }
    }
}

impl FileDispatchConfig {
    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings::default()
            .with_output_cap(self.output_cap_bytes)
            .with_kill_grace(Duration::from_millis(self.kill_grace_ms))
    }
}
