//! Built-in tool set
//!
//! Every built-in tool is a [`BuiltinTool`]: its catalog descriptor, the
//! binding the dispatcher uses to build its command line, and the package
//! that provides its binary (for install suggestions during discovery).
//!
//! | Tool | Binary | Timeout |
//! |------|--------|---------|
//! | `echo_test` | `echo` | 10 s |
//! | `dig`, `whois`, `searchsploit`, `netcat` | same / `nc` | 30 s |
//! | `traceroute`, `whatweb`, `msfvenom` | same | 120 s |
//! | `enum4linux` | same | 300 s |
//! | `nmap`, `masscan`, `nikto`, `gobuster`, `wpscan`, `sqlmap`, `subfinder`, `download` | same / `wget` | 600 s |
//! | `hydra`, `git_clone`, `install_package` | same / `git` / `apt-get` | 1800 s |

mod exploit;
mod fetch;
mod recon;
mod web;

use std::ops::RangeInclusive;
use std::sync::Arc;

use toolbench_domain::tool::{BuildError, ToolBinding, ToolDescriptor, ValidatedParams};

use super::paths::ToolPaths;

pub use fetch::{DOWNLOAD_SCHEMES, PACKAGE_MANAGERS};
pub use recon::{NMAP_SCAN_TYPES, RECORD_TYPES};

/// One built-in tool, ready to be registered.
#[derive(Debug, Clone)]
pub struct BuiltinTool {
    pub descriptor: ToolDescriptor,
    pub binding: ToolBinding,
    /// Distribution package that provides `descriptor.binary`
    pub package: &'static str,
}

impl BuiltinTool {
    fn new(descriptor: ToolDescriptor, binding: ToolBinding, package: &'static str) -> Self {
        Self {
            descriptor,
            binding,
            package,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }
}

/// All built-in tools, in catalog order.
pub fn builtin_tools(paths: &ToolPaths) -> Vec<BuiltinTool> {
    let paths = Arc::new(paths.clone());
    vec![
        recon::echo_test(),
        recon::dig(),
        recon::whois(),
        recon::traceroute(),
        recon::nmap(),
        recon::masscan(),
        recon::netcat(),
        recon::enum4linux(),
        web::whatweb(),
        web::nikto(),
        web::gobuster(Arc::clone(&paths)),
        web::wpscan(),
        exploit::sqlmap(),
        recon::searchsploit(),
        exploit::hydra(Arc::clone(&paths)),
        exploit::msfvenom(Arc::clone(&paths)),
        recon::subfinder(Arc::clone(&paths)),
        fetch::download(Arc::clone(&paths)),
        fetch::git_clone(Arc::clone(&paths)),
        fetch::install_package(),
    ]
}

// ==================== Argument helpers ====================

/// Required text that lands in an operand slot.
///
/// A leading `-` would be parsed by the tool as an option, so it is
/// rejected even though no shell is involved.
fn operand<'a>(params: &'a ValidatedParams, name: &str) -> Result<&'a str, BuildError> {
    let value = params
        .non_empty_str(name)
        .ok_or_else(|| BuildError::invalid(name, "must not be empty"))?;
    if value.starts_with('-') {
        return Err(BuildError::invalid(name, "must not start with '-'"));
    }
    Ok(value)
}

/// Optional operand: empty counts as absent.
fn optional_operand<'a>(
    params: &'a ValidatedParams,
    name: &str,
) -> Result<Option<&'a str>, BuildError> {
    match params.non_empty_str(name) {
        Some(_) => operand(params, name).map(Some),
        None => Ok(None),
    }
}

fn int_in(
    params: &ValidatedParams,
    name: &str,
    range: RangeInclusive<i64>,
) -> Result<i64, BuildError> {
    let value = params
        .get_i64(name)
        .ok_or_else(|| BuildError::invalid(name, "must be an integer"))?;
    if !range.contains(&value) {
        return Err(BuildError::invalid(
            name,
            format!(
                "{} is outside {}-{}",
                value,
                range.start(),
                range.end()
            ),
        ));
    }
    Ok(value)
}

fn choice<'a>(params: &'a ValidatedParams, name: &str) -> Result<&'a str, BuildError> {
    params
        .get_str(name)
        .ok_or_else(|| BuildError::invalid(name, "must be set"))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use toolbench_domain::tool::ToolCatalog;

    #[test]
    fn test_builtin_ids_are_unique_and_registrable() {
        let tools = builtin_tools(&ToolPaths::default());
        assert_eq!(tools.len(), 20);

        let ids: HashSet<&str> = tools.iter().map(BuiltinTool::id).collect();
        assert_eq!(ids.len(), tools.len());

        let catalog =
            ToolCatalog::from_descriptors(tools.iter().map(|t| t.descriptor.clone())).unwrap();
        assert_eq!(catalog.len(), 20);
    }

    #[test]
    fn test_long_running_tools_get_long_timeouts() {
        let timeouts: std::collections::HashMap<String, u64> = builtin_tools(&ToolPaths::default())
            .into_iter()
            .map(|t| (t.descriptor.id.clone(), t.descriptor.timeout.as_secs()))
            .collect();
        assert_eq!(timeouts["hydra"], 1800);
        assert_eq!(timeouts["enum4linux"], 300);
        assert_eq!(timeouts["msfvenom"], 120);
        assert_eq!(timeouts["netcat"], 30);
        for id in ["masscan", "nikto", "wpscan", "sqlmap"] {
            assert_eq!(timeouts[id], 600, "{}", id);
        }
    }

    #[test]
    fn test_every_tool_carries_a_timeout_and_package() {
        for tool in builtin_tools(&ToolPaths::default()) {
            assert!(!tool.descriptor.timeout.is_zero(), "{}", tool.id());
            assert!(!tool.package.is_empty(), "{}", tool.id());
            assert!(tool.descriptor.check_schema().is_ok(), "{}", tool.id());
        }
    }

    #[test]
    fn test_operand_rejects_option_injection() {
        let params = ValidatedParams::new().with("target", "--script=evil");
        let err = operand(&params, "target").unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter { ref param, .. } if param == "target"));

        let params = ValidatedParams::new().with("target", "   ");
        assert!(operand(&params, "target").is_err());
        assert_eq!(optional_operand(&params, "target"), Ok(None));
    }

    #[test]
    fn test_int_in_range() {
        let params = ValidatedParams::new().with("threads", 500i64);
        let err = int_in(&params, "threads", 1..=200).unwrap_err();
        assert!(err.to_string().contains("500 is outside 1-200"));
        assert_eq!(int_in(&params, "threads", 1..=500), Ok(500));
    }
}
