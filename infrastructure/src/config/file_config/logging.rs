//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file that receives one record per handled request
    pub execution_log: Option<PathBuf>,
    /// File that receives tracing output in addition to stderr
    pub file: Option<PathBuf>,
}
