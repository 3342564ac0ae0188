//! Console output formatter for reports and listings

use crate::output::view::{ConfigIssueRow, ConfigSourceRow, MissingToolRow, ToolRow};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use toolbench_domain::execution::ExecutionReport;
use toolbench_domain::tool::{ClarificationRequest, ParameterSpec, ToolCategory};

/// Formats dispatcher results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format an execution report
    pub fn format_report(report: &ExecutionReport) -> String {
        let mut output = String::new();

        let status = if report.success {
            "✓ success".green().bold()
        } else {
            match report.failure_reason {
                Some(reason) => format!("✗ {}", reason).red().bold(),
                None => "✗ failed".red().bold(),
            }
        };
        let id = report
            .execution_id
            .map(|id| format!(" {}", id).dimmed().to_string())
            .unwrap_or_default();
        output.push_str(&format!("{} {}{}\n", report.tool_id.cyan().bold(), status, id));

        if let Some(command) = &report.command {
            output.push_str(&format!("{} {}\n", "Command:".dimmed(), command));
        }

        let mut facts = vec![format!("{}ms", report.duration_ms)];
        if let Some(code) = report.exit_code {
            facts.push(format!("exit {}", code));
        }
        output.push_str(&format!("{} {}\n", "Took:".dimmed(), facts.join(", ")));

        output.push('\n');
        output.push_str(&report.summary);
        if !report.summary.ends_with('\n') {
            output.push('\n');
        }

        if !report.extras.is_empty() {
            output.push_str(&Self::section_header("Extras"));
            for (key, value) in &report.extras {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                output.push_str(&format!("  {}: {}\n", key.bold(), value));
            }
        }

        if !report.warnings.is_empty() {
            output.push('\n');
            for warning in &report.warnings {
                output.push_str(&format!("{} {}\n", "warning:".yellow().bold(), warning));
            }
        }

        output
    }

    /// Format any serializable value as pretty JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a request for clarification
    pub fn format_clarification(request: &ClarificationRequest) -> String {
        format!("{} {}\n", "?".yellow().bold(), request.message)
    }

    /// Format the tool catalog, grouped by category
    pub fn format_tools(rows: &[ToolRow<'_>]) -> String {
        if rows.is_empty() {
            return format!("{}\n", "No tools match.".dimmed());
        }

        let mut grouped: BTreeMap<ToolCategory, Vec<&ToolRow<'_>>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.descriptor.category).or_default().push(row);
        }

        let width = rows
            .iter()
            .map(|r| r.descriptor.id.len())
            .max()
            .unwrap_or(0);

        let mut output = String::new();
        for (category, tools) in grouped {
            output.push_str(&Self::section_header(category.as_str()));
            for row in tools {
                let d = row.descriptor;
                let id = format!("{:width$}", d.id, width = width);
                let id = if row.installed {
                    id.bold()
                } else {
                    id.dimmed()
                };
                output.push_str(&format!("  {}  {}", id, d.description));
                if !row.installed {
                    output.push_str(&format!(" {}", "(not installed)".yellow()));
                }
                output.push('\n');
                if !d.parameters.is_empty() {
                    let params: Vec<String> = d.parameters.iter().map(Self::parameter).collect();
                    output.push_str(&format!(
                        "  {:width$}  {} {}\n",
                        "",
                        "params:".dimmed(),
                        params.join(" "),
                        width = width
                    ));
                }
            }
        }
        output
    }

    /// Format host discovery results
    pub fn format_discovery(
        installed: &BTreeMap<ToolCategory, Vec<&str>>,
        missing: &[MissingToolRow<'_>],
    ) -> String {
        let mut output = String::new();

        let count: usize = installed.values().map(Vec::len).sum();
        output.push_str(&format!(
            "{}\n",
            format!("Installed ({}):", count).green().bold()
        ));
        for (category, ids) in installed {
            output.push_str(&format!("  {:14} {}\n", category.as_str(), ids.join(", ")));
        }

        if !missing.is_empty() {
            output.push_str(&format!(
                "\n{}\n",
                format!("Missing ({}):", missing.len()).yellow().bold()
            ));
            for tool in missing {
                output.push_str(&format!(
                    "  {:14} {}  {}\n",
                    tool.id,
                    format!("({})", tool.binary).dimmed(),
                    tool.install_hint
                ));
            }
        }

        output
    }

    /// Format configuration file locations, highest priority first
    pub fn format_config_sources(sources: &[ConfigSourceRow<'_>]) -> String {
        let mut output = format!("{}\n", "Configuration sources (highest priority first):".bold());
        for (i, source) in sources.iter().enumerate() {
            let location = source
                .location
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            let status = if source.found {
                "[found]".green()
            } else {
                "[not found]".dimmed()
            };
            output.push_str(&format!(
                "  {}. {:10} {} {}\n",
                i + 1,
                source.label,
                location,
                status
            ));
        }
        output
    }

    /// Format configuration issues, one per line
    pub fn format_config_issues(issues: &[ConfigIssueRow<'_>]) -> String {
        if issues.is_empty() {
            return format!("{}\n", "Configuration OK".green());
        }
        issues
            .iter()
            .map(|issue| {
                let tag = if issue.is_error {
                    "error:".red().bold()
                } else {
                    "warning:".yellow().bold()
                };
                format!("{} {}\n", tag, issue.message)
            })
            .collect()
    }

    /// Format a fatal error
    pub fn format_error(message: &str) -> String {
        format!("{} {}\n", "error:".red().bold(), message)
    }

    fn parameter(spec: &ParameterSpec) -> String {
        if spec.required {
            format!("{}", spec.name.bold())
        } else if let Some(default) = &spec.default {
            format!("[{}={}]", spec.name, default)
        } else {
            format!("[{}]", spec.name)
        }
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", title.cyan().bold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use toolbench_domain::execution::{ExecutionId, FailureReason, ReportWarning};
    use toolbench_domain::tool::{ParamType, ToolDescriptor};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_success_report() {
        plain();
        let report = ExecutionReport::success("dig", "example.com. 300 IN A 93.184.216.34")
            .with_execution_id(ExecutionId::new(7))
            .with_command("dig example.com A")
            .with_extra("discovered_count", 3);
        let out = ConsoleFormatter::format_report(&report);

        assert!(out.starts_with("dig ✓ success"));
        assert!(out.contains("Command: dig example.com A"));
        assert!(out.contains("93.184.216.34"));
        assert!(out.contains("discovered_count: 3"));
        assert!(!out.contains("warning:"));
    }

    #[test]
    fn test_format_failure_report() {
        plain();
        let mut report = ExecutionReport::failure(
            "nmap",
            FailureReason::TimedOut,
            "nmap did not finish within 600s",
        );
        report.warnings.push(ReportWarning::OutputTruncated {
            stream: "stdout".to_string(),
            captured_bytes: 1024,
            total_bytes: 4096,
        });
        let out = ConsoleFormatter::format_report(&report);

        assert!(out.contains("✗ TimedOut"));
        assert!(out.contains("did not finish"));
        assert!(out.contains("warning: stdout truncated: kept 1024 of 4096 bytes"));
    }

    #[test]
    fn test_format_json_report() {
        let report = ExecutionReport::success("whois", "ok");
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&report)).unwrap();
        assert_eq!(json["toolId"], "whois");
        assert_eq!(json["success"], true);
    }

    #[test]
    fn test_format_tools_grouped() {
        plain();
        let dig = ToolDescriptor::new("dig", ToolCategory::Dns, "DNS lookup")
            .with_parameter(ParameterSpec::required("domain", "Domain"))
            .with_parameter(
                ParameterSpec::optional("record_type", "Record type")
                    .choice(["A", "MX"])
                    .with_default("A"),
            );
        let nmap = ToolDescriptor::new("nmap", ToolCategory::NetworkScan, "Port scanner")
            .with_parameter(
                ParameterSpec::optional("ports", "Ports").with_type(ParamType::String),
            );
        let rows = [
            ToolRow {
                descriptor: &nmap,
                installed: false,
            },
            ToolRow {
                descriptor: &dig,
                installed: true,
            },
        ];
        let out = ConsoleFormatter::format_tools(&rows);

        let network = out.find("network_scan").unwrap();
        let dns = out.find("dns").unwrap();
        assert!(network < dns, "categories follow declaration order");
        assert!(out.contains("domain [record_type=A]"));
        assert!(out.contains("Port scanner (not installed)"));
        assert!(out.contains("[ports]"));
    }

    #[test]
    fn test_format_tools_empty() {
        plain();
        assert_eq!(ConsoleFormatter::format_tools(&[]), "No tools match.\n");
    }

    #[test]
    fn test_format_discovery() {
        plain();
        let mut installed = BTreeMap::new();
        installed.insert(ToolCategory::Dns, vec!["dig", "subfinder"]);
        let missing = [MissingToolRow {
            id: "gobuster",
            binary: "gobuster",
            install_hint: "sudo apt install gobuster",
        }];
        let out = ConsoleFormatter::format_discovery(&installed, &missing);

        assert!(out.starts_with("Installed (2):"));
        assert!(out.contains("dig, subfinder"));
        assert!(out.contains("Missing (1):"));
        assert!(out.contains("sudo apt install gobuster"));
    }

    #[test]
    fn test_format_config_sources() {
        plain();
        let sources = [
            ConfigSourceRow {
                label: "project",
                location: Some(Path::new("./toolbench.toml")),
                found: true,
            },
            ConfigSourceRow {
                label: "default",
                location: None,
                found: true,
            },
        ];
        let out = ConsoleFormatter::format_config_sources(&sources);
        assert!(out.contains("1. project    ./toolbench.toml [found]"));
        assert!(out.contains("2. default    - [found]"));
    }

    #[test]
    fn test_format_config_issues() {
        plain();
        assert_eq!(
            ConsoleFormatter::format_config_issues(&[]),
            "Configuration OK\n"
        );
        let issues = [
            ConfigIssueRow {
                is_error: true,
                message: "dispatch.output_cap_bytes is 0",
            },
            ConfigIssueRow {
                is_error: false,
                message: "tools.disabled: unknown tool 'x'",
            },
        ];
        let out = ConsoleFormatter::format_config_issues(&issues);
        assert_eq!(
            out,
            "error: dispatch.output_cap_bytes is 0\nwarning: tools.disabled: unknown tool 'x'\n"
        );
    }
}
