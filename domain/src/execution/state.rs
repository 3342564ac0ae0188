//! Dispatch state machine.
//!
//! ```text
//! Received ──> Validated ──> Built ──> Running ──> Normalized ──> Done
//!     │            │           │          │            │
//!     └────────────┴───────────┴──────────┴────────────┴──> Errored
//! ```
//!
//! `Errored` and `Done` are absorbing. An `Errored` state without a reason
//! marks a fatal error that produced no report.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::report::FailureReason;
use super::request::ExecutionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DispatchState {
    Received,
    Validated,
    Built,
    Running,
    Normalized,
    Done,
    Errored { reason: Option<FailureReason> },
}

impl DispatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Errored { .. })
    }

    pub fn can_transition_to(&self, next: &DispatchState) -> bool {
        use DispatchState::*;
        match (self, next) {
            (s, Errored { .. }) => !s.is_terminal(),
            (Received, Validated)
            | (Validated, Built)
            | (Built, Running)
            | (Running, Normalized)
            | (Normalized, Done) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Built => "built",
            Self::Running => "running",
            Self::Normalized => "normalized",
            Self::Done => "done",
            Self::Errored { .. } => "errored",
        }
    }
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Errored {
                reason: Some(reason),
            } => write!(f, "errored({})", reason),
            Self::Errored { reason: None } => f.write_str("errored(fatal)"),
            other => f.write_str(other.name()),
        }
    }
}

/// Rejected attempt to move a dispatch into a state it cannot reach.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid dispatch transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: DispatchState,
    pub to: DispatchState,
}

/// Lifecycle of one dispatch, tracked by the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchRecord {
    pub id: ExecutionId,
    pub tool_id: String,
    state: DispatchState,
    history: Vec<DispatchState>,
    started: Instant,
}

impl DispatchRecord {
    pub fn new(id: ExecutionId, tool_id: impl Into<String>) -> Self {
        Self {
            id,
            tool_id: tool_id.into(),
            state: DispatchState::Received,
            history: vec![DispatchState::Received],
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn history(&self) -> &[DispatchState] {
        &self.history
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn advance(&mut self, next: DispatchState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(&next) {
            return Err(InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(
            execution = %self.id,
            tool = %self.tool_id,
            from = %self.state,
            to = %next,
            "Dispatch transition"
        );
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Move to `Errored`. No-op once terminal.
    pub fn fail(&mut self, reason: Option<FailureReason>) {
        let _ = self.advance(DispatchState::Errored { reason });
    }
}
