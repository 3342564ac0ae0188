//! Configuration file loading for toolbench
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `TOOLBENCH_<SECTION>__<KEY>` (e.g. `TOOLBENCH_DISPATCH__KILL_GRACE_MS`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./toolbench.toml` or `./.toolbench.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/toolbench/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigIssueCode, FileConfig, FileDispatchConfig, FileLoggingConfig,
    FileOutputConfig, FileOutputFormat, FilePathsConfig, FileToolsConfig, Severity,
};
pub use loader::{ConfigError, ConfigLoader, ConfigSource};
