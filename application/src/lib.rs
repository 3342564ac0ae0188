//! Application layer for toolbench
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    dispatch_observer::{DispatchObserver, NoDispatchObserver},
    execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger},
    intent_interpreter::{IntentInterpreter, InterpretError},
    process_supervisor::{ProcessSupervisorPort, SupervisorError},
};
pub use use_cases::dispatch::Dispatcher;
pub use use_cases::handle_request::{HandleRequestError, HandleRequestUseCase, RequestOutcome};
