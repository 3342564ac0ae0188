//! Host tool discovery
//!
//! Probes the host for the binary behind each built-in tool and reports
//! which ones are usable. Missing tools come back with an install hint so
//! the caller can tell the user how to get them.
//!
//! ```text
//! $ toolbench discover
//! Installed (9):
//!   dns          dig, subfinder
//!   network_scan nmap, traceroute
//!   ...
//! Missing (3):
//!   gobuster      sudo apt install gobuster
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use toolbench_domain::tool::ToolCategory;
use tracing::debug;

use super::builtin::BuiltinTool;

/// A tool whose binary was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedTool {
    pub id: String,
    pub category: ToolCategory,
    pub binary: String,
    pub path: PathBuf,
}

/// A tool whose binary is not on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub id: String,
    pub category: ToolCategory,
    pub binary: String,
    /// Command that would install the binary
    pub install_hint: String,
}

/// Result of tool discovery
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    pub installed: Vec<DetectedTool>,
    pub missing: Vec<MissingTool>,
}

impl DiscoveryResult {
    pub fn is_installed(&self, tool_id: &str) -> bool {
        self.installed.iter().any(|t| t.id == tool_id)
    }

    /// Installed tool ids grouped by category, in category order.
    pub fn installed_by_category(&self) -> BTreeMap<ToolCategory, Vec<&str>> {
        let mut grouped: BTreeMap<ToolCategory, Vec<&str>> = BTreeMap::new();
        for tool in &self.installed {
            grouped.entry(tool.category).or_default().push(&tool.id);
        }
        grouped
    }
}

/// Discover which built-in tools are usable on this host.
pub fn discover_tools(tools: &[BuiltinTool]) -> DiscoveryResult {
    discover_with(tools, |binary| which::which(binary).ok())
}

/// Discovery with an explicit probe, mapping a binary name to its path.
pub fn discover_with<F>(tools: &[BuiltinTool], probe: F) -> DiscoveryResult
where
    F: Fn(&str) -> Option<PathBuf>,
{
    let mut result = DiscoveryResult::default();

    for tool in tools {
        let descriptor = &tool.descriptor;
        match probe(&descriptor.binary) {
            Some(path) => {
                debug!(tool = %descriptor.id, path = %path.display(), "Found tool binary");
                result.installed.push(DetectedTool {
                    id: descriptor.id.clone(),
                    category: descriptor.category,
                    binary: descriptor.binary.clone(),
                    path,
                });
            }
            None => {
                debug!(tool = %descriptor.id, binary = %descriptor.binary, "Tool binary not found");
                result.missing.push(MissingTool {
                    id: descriptor.id.clone(),
                    category: descriptor.category,
                    binary: descriptor.binary.clone(),
                    install_hint: install_hint(tool.package),
                });
            }
        }
    }

    result
}

fn install_hint(package: &str) -> String {
    format!("sudo apt install {}", package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::builtin_tools;
    use crate::tools::paths::ToolPaths;

    fn fake_probe(binary: &str) -> Option<PathBuf> {
        match binary {
            "nmap" | "dig" | "/bin/echo" => Some(PathBuf::from("/usr/bin").join(binary)),
            _ => None,
        }
    }

    #[test]
    fn test_discover_with_probe() {
        let tools = builtin_tools(&ToolPaths::default());
        let result = discover_with(&tools, fake_probe);

        assert_eq!(result.installed.len(), 3);
        assert_eq!(result.installed.len() + result.missing.len(), tools.len());
        assert!(result.is_installed("nmap"));
        assert!(result.is_installed("echo_test"));
        assert!(!result.is_installed("gobuster"));

        let gobuster = result.missing.iter().find(|t| t.id == "gobuster").unwrap();
        assert_eq!(gobuster.install_hint, "sudo apt install gobuster");

        let download = result.missing.iter().find(|t| t.id == "download").unwrap();
        assert_eq!(download.binary, "wget");

        let netcat = result.missing.iter().find(|t| t.id == "netcat").unwrap();
        assert_eq!(netcat.binary, "nc");
        assert_eq!(netcat.install_hint, "sudo apt install netcat-openbsd");
    }

    #[test]
    fn test_installed_by_category() {
        let tools = builtin_tools(&ToolPaths::default());
        let result = discover_with(&tools, fake_probe);
        let grouped = result.installed_by_category();

        assert_eq!(grouped[&ToolCategory::NetworkScan], vec!["nmap"]);
        assert_eq!(grouped[&ToolCategory::Dns], vec!["dig"]);
        assert_eq!(grouped[&ToolCategory::Utilities], vec!["echo_test"]);
        assert!(!grouped.contains_key(&ToolCategory::WebScan));
    }

    #[test]
    fn test_discover_tools_on_host() {
        // Actual results depend on what's installed
        let tools = builtin_tools(&ToolPaths::default());
        let result = discover_tools(&tools);
        assert_eq!(result.installed.len() + result.missing.len(), tools.len());
    }
}
