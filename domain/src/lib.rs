//! Domain layer for toolbench
//!
//! This crate contains the core entities, value objects and pure logic of
//! the dispatch engine. It has no dependencies on infrastructure or
//! presentation concerns and never spawns processes.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! A [`ToolDescriptor`] describes an external command-line tool: its
//! category, parameter schema and timeout. The [`ToolCatalog`] holds all
//! known descriptors.
//!
//! ## Intents
//!
//! An [`Intent`] names a tool and carries raw parameters. It is validated
//! into [`ValidatedParams`] and handed to the tool's [`CommandBuilder`],
//! which produces an argument vector.
//!
//! ## Execution
//!
//! A supervised run yields an [`ExecutionOutcome`], which the
//! [`ResultNormalizer`] classifies into an [`ExecutionReport`].

pub mod execution;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use execution::{
    ArtifactError, CapturedStream, DispatchError, DispatchRecord, DispatchState, ExecutionId,
    ExecutionOutcome, ExecutionReport, ExecutionRequest, Extras, FailureReason, PostProcessor,
    ReportWarning, ResultNormalizer,
};
pub use tool::{
    BuildError, BuilderTable, CatalogError, ClarificationRequest, CommandBuilder, CommandLine,
    DefaultToolValidator, HistoryEntry, Intent, Interpretation, ParamType, ParamValue,
    ParameterSpec, ToolBinding, ToolCatalog, ToolCategory, ToolDescriptor, ToolValidator,
    ValidatedParams, ValidationError,
};
