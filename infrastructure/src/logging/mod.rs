//! Logging infrastructure for structured execution history.
//!
//! Provides [`JsonlExecutionLogger`], a JSONL file writer that implements
//! the [`ExecutionLogger`](toolbench_application::ExecutionLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlExecutionLogger;
