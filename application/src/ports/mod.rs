//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod dispatch_observer;
pub mod execution_logger;
pub mod intent_interpreter;
pub mod process_supervisor;
