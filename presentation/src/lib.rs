//! Presentation layer for toolbench
//!
//! This crate contains CLI definitions, output formatters
//! and the dispatch progress reporter.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, ConfigArgs, OutputFormat, RunArgs, ToolsArgs};
pub use output::{ConfigIssueRow, ConfigSourceRow, ConsoleFormatter, MissingToolRow, ToolRow};
pub use progress::DispatchProgress;
