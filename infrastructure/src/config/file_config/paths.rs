//! Paths configuration from TOML (`[paths]` section)
//!
//! ```toml
//! [paths]
//! artifact_dir = "/srv/toolbench"
//!
//! [paths.wordlists]
//! common = "/opt/SecLists/Discovery/Web-Content/common.txt"
//! ```
//!
//! Wordlist entries add to or replace the built-in aliases.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::tools::paths::{DEFAULT_ARTIFACT_DIR, ToolPaths};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePathsConfig {
    pub artifact_dir: PathBuf,
    pub wordlists: BTreeMap<String, PathBuf>,
}

impl Default for FilePathsConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            wordlists: BTreeMap::new(),
        }
    }
}

impl FilePathsConfig {
    pub fn tool_paths(&self) -> ToolPaths {
        self.wordlists.iter().fold(
            ToolPaths::default().with_artifact_dir(&self.artifact_dir),
            |paths, (alias, path)| paths.with_wordlist(alias, path),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_paths_merges_wordlists() {
        let toml_str = r#"
artifact_dir = "/srv/toolbench"

[wordlists]
common = "/opt/common.txt"
api = "/opt/api.txt"
"#;
        let config: FilePathsConfig = toml::from_str(toml_str).unwrap();
        let paths = config.tool_paths();

        assert_eq!(paths.artifact_dir, PathBuf::from("/srv/toolbench"));
        assert_eq!(paths.resolve_wordlist("common"), PathBuf::from("/opt/common.txt"));
        assert_eq!(paths.resolve_wordlist("api"), PathBuf::from("/opt/api.txt"));
        assert_eq!(
            paths.resolve_wordlist("dns"),
            PathBuf::from("/usr/share/wordlists/dnsmap.txt")
        );
    }
}
