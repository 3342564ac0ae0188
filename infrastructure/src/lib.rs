//! Infrastructure layer for toolbench
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: local process supervision, the built-in tool set,
//! request interpretation, configuration file loading and the execution log.

pub mod config;
pub mod interpreter;
pub mod logging;
pub mod process;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigIssue, ConfigLoader, ConfigSource, FileConfig, FileOutputConfig,
    FileOutputFormat, Severity,
};
pub use interpreter::StructuredIntentInterpreter;
pub use logging::JsonlExecutionLogger;
pub use process::{LocalProcessSupervisor, SupervisorSettings};
pub use tools::{
    BuiltinTool, DiscoveryResult, ToolPaths, assemble_toolset, builtin_tools, discover_tools,
};
