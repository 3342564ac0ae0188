//! Application-level configuration.
//!
//! - [`ExecutionParams`] - per-dispatch runtime parameters (working directory,
//!   timeout overrides)

pub mod execution_params;

pub use execution_params::ExecutionParams;
