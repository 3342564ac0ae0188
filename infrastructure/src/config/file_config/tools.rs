//! Tools configuration from TOML (`[tools]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [tools]
//! disabled = ["install_package"]
//! only_installed = true
//!
//! [tools.timeouts]
//! nmap = 1200      # seconds
//! gobuster = 900
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Per-tool timeout overrides in seconds
    pub timeouts: BTreeMap<String, u64>,
    /// Tool ids left out of the catalog
    pub disabled: Vec<String>,
    /// Register only tools whose binary is found on this host
    pub only_installed: bool,
}

impl FileToolsConfig {
    /// Non-zero timeout overrides.
    pub fn timeout_overrides(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.timeouts
            .iter()
            .filter(|(_, secs)| **secs > 0)
            .map(|(id, secs)| (id.as_str(), Duration::from_secs(*secs)))
    }
}
