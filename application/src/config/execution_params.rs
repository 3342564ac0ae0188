//! Execution parameters for the dispatcher.
//!
//! [`ExecutionParams`] groups the runtime knobs the
//! [`Dispatcher`](crate::use_cases::dispatch::Dispatcher) applies to every
//! execution. Process-level limits (output cap, kill grace) belong to the
//! supervisor adapter, not here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use toolbench_domain::tool::ToolDescriptor;

#[derive(Debug, Clone, Default)]
pub struct ExecutionParams {
    /// Working directory for child processes. `None` inherits ours.
    pub working_dir: Option<PathBuf>,
    /// Per-tool timeout overrides, keyed by tool identifier.
    pub timeout_overrides: HashMap<String, Duration>,
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout_override(mut self, tool_id: impl Into<String>, timeout: Duration) -> Self {
        self.timeout_overrides.insert(tool_id.into(), timeout);
        self
    }

    /// Effective timeout: an override wins over the descriptor's own.
    pub fn timeout_for(&self, descriptor: &ToolDescriptor) -> Duration {
        self.timeout_overrides
            .get(&descriptor.id)
            .copied()
            .filter(|t| !t.is_zero())
            .unwrap_or(descriptor.timeout)
    }
}
