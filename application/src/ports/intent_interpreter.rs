//! Intent interpreter port
//!
//! Defines the interface to the service that turns free text into an
//! [`Intent`](toolbench_domain::Intent) or asks for clarification.

use async_trait::async_trait;
use thiserror::Error;
use toolbench_domain::tool::{HistoryEntry, Interpretation, ToolDescriptor};

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("interpreter unavailable: {0}")]
    Unavailable(String),

    #[error("interpreter failed: {0}")]
    Failed(String),
}

/// Port for natural-language interpretation
///
/// The interpreter sees the catalog so it can only name known tools.
/// It never dispatches anything itself.
#[async_trait]
pub trait IntentInterpreter: Send + Sync {
    async fn interpret(
        &self,
        text: &str,
        history: &[HistoryEntry],
        tools: &[ToolDescriptor],
    ) -> Result<Interpretation, InterpretError>;
}
