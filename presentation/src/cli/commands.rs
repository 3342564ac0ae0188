//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use toolbench_domain::tool::{Intent, ToolCategory};

/// Output format for reports and listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON, one document per command
    Json,
}

/// CLI arguments for toolbench
#[derive(Parser, Debug)]
#[command(name = "toolbench")]
#[command(author, version, about = "Run security and networking tools from structured intents")]
#[command(long_about = r#"
toolbench validates a structured intent against a tool's parameter schema,
builds an argument vector (never a shell string), runs the tool under a
timeout and output cap, and prints a normalized report.

Configuration files are loaded from (in priority order):
1. TOOLBENCH_* environment variables (nested keys split on "__")
2. --config <path>                        Explicit config file
3. ./toolbench.toml or ./.toolbench.toml  Project-level config
4. ~/.config/toolbench/config.toml        Global config

Example:
  toolbench tools --category dns
  toolbench run dig domain=example.com record_type=MX
  toolbench run nmap target=10.0.0.1 scan_type=quick --explain "sweep the gateway"
  toolbench intent '{"toolId":"whois","parameters":{"target":"example.com"}}'
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress spinners on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (overrides `[output].format`)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write tracing output to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the tools in the catalog
    Tools(ToolsArgs),
    /// Run a tool with key=value parameters
    Run(RunArgs),
    /// Run a JSON intent: {"toolId": ..., "parameters": {...}}
    Intent {
        /// The intent document
        #[arg(value_name = "JSON")]
        json: String,
    },
    /// Check which tool binaries are installed on this host
    Discover,
    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Only list tools in this category (e.g. dns, network_scan)
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<ToolCategory>,

    /// Include tools whose binary is not installed
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Tool identifier, as shown by `toolbench tools`
    pub tool_id: String,

    /// Tool parameters
    #[arg(value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Why this tool is being run (logged with the report)
    #[arg(long, value_name = "TEXT")]
    pub explain: Option<String>,
}

impl RunArgs {
    /// The intent these arguments describe. Values stay strings; the
    /// validator coerces them to each parameter's declared type.
    pub fn to_intent(&self) -> Intent {
        let intent = self
            .params
            .iter()
            .fold(Intent::new(&self.tool_id), |intent, (key, value)| {
                intent.with_param(key, Value::String(value.clone()))
            });
        match &self.explain {
            Some(explanation) => intent.with_explanation(explanation),
            None => intent,
        }
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show configuration file locations
    #[arg(long)]
    pub sources: bool,

    /// Validate the merged configuration and list issues
    #[arg(long)]
    pub validate: bool,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("missing parameter name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
