//! Tool domain module
//!
//! Defines what a tool is and how a request for one becomes a command line.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌─────────────────┐    ┌─────────────┐
//! │ Intent       │───▶│ ToolValidator│───▶│ ValidatedParams │───▶│ CommandLine │
//! │ (untrusted)  │    │ + Descriptor │    │ (typed)         │    │ (argv)      │
//! └──────────────┘    └──────────────┘    └─────────────────┘    └─────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolCatalog`] - registry of [`ToolDescriptor`]s, read-mostly
//! - [`ToolDescriptor`] / [`ParameterSpec`] - a tool's schema and timeout
//! - [`Intent`] - tool id plus loosely typed parameters from the interpreter
//! - [`ToolValidator`] - turns an intent into [`ValidatedParams`]
//! - [`CommandBuilder`] / [`BuilderTable`] - per-tool argv construction
//!
//! Nothing in this module starts processes or touches the filesystem.

pub mod builder;
pub mod catalog;
pub mod entities;
pub mod intent;
pub mod traits;
pub mod value_objects;

pub use builder::{BuildError, BuilderTable, CommandBuilder, CommandLine, ToolBinding};
pub use catalog::{CatalogError, ToolCatalog};
pub use entities::{DEFAULT_TOOL_TIMEOUT, ParamType, ParameterSpec, ToolCategory, ToolDescriptor};
pub use intent::{ClarificationRequest, HistoryEntry, Intent, Interpretation};
pub use traits::{DefaultToolValidator, ToolValidator, ValidationError};
pub use value_objects::{ParamValue, ValidatedParams};
