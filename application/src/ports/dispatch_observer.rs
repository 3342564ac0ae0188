//! Dispatch observer port
//!
//! Callbacks for watching a dispatch move through its states. Used by the
//! presentation layer for progress output and by tests to assert that no
//! process was started.

use toolbench_domain::execution::{DispatchState, ExecutionId, ExecutionReport};
use toolbench_domain::tool::CommandLine;

pub trait DispatchObserver: Send + Sync {
    /// Called after every state change, including `Errored`.
    fn on_transition(&self, _id: ExecutionId, _tool_id: &str, _state: DispatchState) {}

    /// Called right before the supervisor is asked to start a process.
    fn on_process_start(&self, _id: ExecutionId, _command: &CommandLine) {}

    /// Called once a report is ready for the caller.
    fn on_report(&self, _id: ExecutionId, _report: &ExecutionReport) {}
}

/// No-op observer
pub struct NoDispatchObserver;

impl DispatchObserver for NoDispatchObserver {}
