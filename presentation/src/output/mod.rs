//! Output formatting

pub mod console;
pub mod view;

pub use console::ConsoleFormatter;
pub use view::{ConfigIssueRow, ConfigSourceRow, MissingToolRow, ToolRow};
