//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.

mod dispatch;
mod logging;
mod output;
mod paths;
mod tools;

pub use dispatch::FileDispatchConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use paths::FilePathsConfig;
pub use tools::FileToolsConfig;

use serde::{Deserialize, Serialize};
use toolbench_application::config::ExecutionParams;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The setting cannot work and will be ignored or break dispatch.
    Error,
    /// The setting works but probably not as intended.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A tool id that no built-in tool has
    UnknownTool { field: String, tool: String },
    /// `dispatch.output_cap_bytes = 0`
    ZeroOutputCap,
    /// A timeout override of zero seconds
    ZeroTimeout { tool: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Process supervision settings
    pub dispatch: FileDispatchConfig,
    /// Per-tool settings
    pub tools: FileToolsConfig,
    /// Artifact directory and wordlists
    pub paths: FilePathsConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
    /// Report printing
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration against the known tool ids, returning
    /// every issue found.
    pub fn validate(&self, known_tools: &[&str]) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.dispatch.output_cap_bytes == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::ZeroOutputCap,
                message: "dispatch.output_cap_bytes is 0; no tool output would be captured"
                    .to_string(),
            });
        }

        for (tool, secs) in &self.tools.timeouts {
            if !known_tools.contains(&tool.as_str()) {
                issues.push(ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::UnknownTool {
                        field: "tools.timeouts".to_string(),
                        tool: tool.clone(),
                    },
                    message: format!("tools.timeouts: unknown tool '{}'", tool),
                });
            }
            if *secs == 0 {
                issues.push(ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::ZeroTimeout { tool: tool.clone() },
                    message: format!(
                        "tools.timeouts.{}: 0 is ignored, the built-in timeout applies",
                        tool
                    ),
                });
            }
        }

        for tool in &self.tools.disabled {
            if !known_tools.contains(&tool.as_str()) {
                issues.push(ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::UnknownTool {
                        field: "tools.disabled".to_string(),
                        tool: tool.clone(),
                    },
                    message: format!("tools.disabled: unknown tool '{}'", tool),
                });
            }
        }

        issues
    }

    /// Dispatcher parameters derived from `[dispatch]` and `[tools]`.
    pub fn execution_params(&self) -> ExecutionParams {
        let params = self
            .tools
            .timeout_overrides()
            .fold(ExecutionParams::default(), |params, (tool, timeout)| {
                params.with_timeout_override(tool, timeout)
            });
        match &self.dispatch.working_dir {
            Some(dir) => params.with_working_dir(dir),
            None => params,
        }
    }
}
