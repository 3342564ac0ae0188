//! Execution domain module
//!
//! Types describing one run of a tool, from request to report:
//!
//! ```text
//! ExecutionRequest ──> ExecutionOutcome ──> ExecutionReport
//!   (argv, timeout)    (exit, capture)      (classified)
//! ```
//!
//! - [`ExecutionRequest`] - argument vector, timeout and working directory
//! - [`ExecutionOutcome`] - raw exit status and bounded capture
//! - [`ResultNormalizer`] - pure classification into an [`ExecutionReport`]
//! - [`DispatchState`] / [`DispatchRecord`] - per-request state machine
//! - [`DispatchError`] - validation, cancellation and fatal errors

pub mod error;
pub mod normalizer;
pub mod report;
pub mod request;
pub mod state;

pub use error::DispatchError;
pub use normalizer::{ArtifactError, PostProcessor, ResultNormalizer};
pub use report::{ExecutionReport, Extras, FailureReason, ReportWarning};
pub use request::{CapturedStream, ExecutionId, ExecutionOutcome, ExecutionRequest};
pub use state::{DispatchRecord, DispatchState, InvalidTransition};
