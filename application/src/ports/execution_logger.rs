//! Port for structured execution history.
//!
//! Defines the [`ExecutionLogger`] trait for recording requests and their
//! reports to a machine-readable log. The dispatcher itself keeps no
//! history; callers that want one use this port.
//!
//! This is separate from `tracing`-based diagnostics: tracing carries
//! human-readable operational messages, this port carries one record per
//! handled request.

use serde_json::Value;

/// A structured execution event for logging.
pub struct ExecutionEvent {
    /// Event type identifier (e.g., "report", "clarification").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ExecutionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging execution events.
///
/// `log` is synchronous and infallible; logging problems never disturb
/// dispatch.
pub trait ExecutionLogger: Send + Sync {
    fn log(&self, event: ExecutionEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoExecutionLogger;

impl ExecutionLogger for NoExecutionLogger {
    fn log(&self, _event: ExecutionEvent) {}
}
