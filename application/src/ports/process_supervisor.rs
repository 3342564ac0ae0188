//! Process supervisor port
//!
//! Defines the interface for running one argument vector as a supervised
//! child process.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use toolbench_domain::execution::{ExecutionOutcome, ExecutionRequest};

/// Failures to start or track a process.
///
/// Ordinary failures of a started process (non-zero exit, timeout,
/// cancellation) are encoded in [`ExecutionOutcome`], never here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    /// The program does not exist on this host.
    #[error("program not found: {program}")]
    ProgramNotFound { program: String },

    /// The OS refused to create the process for any other reason.
    #[error("failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    /// Waiting on a started process failed.
    #[error("lost track of {program}: {message}")]
    Wait { program: String, message: String },
}

/// Port for supervised process execution
///
/// Implementations never invoke a shell, bound the capture of each output
/// stream, and enforce `request.timeout`. When `cancel` fires the child is
/// terminated and the outcome comes back with `cancelled` set.
#[async_trait]
pub trait ProcessSupervisorPort: Send + Sync {
    async fn run(
        &self,
        request: ExecutionRequest,
        cancel: CancellationToken,
    ) -> Result<ExecutionOutcome, SupervisorError>;
}
