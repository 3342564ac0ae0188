//! Web tools: fingerprinting, content brute forcing and vulnerability
//! scanning.

use std::sync::Arc;

use toolbench_domain::tool::{
    BuildError, CommandLine, ParamType, ParameterSpec, ToolBinding, ToolCategory, ToolDescriptor,
    ValidatedParams,
};

use super::{BuiltinTool, choice, int_in, operand, optional_operand};
use crate::tools::paths::ToolPaths;

const GOBUSTER_MODES: [&str; 3] = ["dir", "dns", "vhost"];

pub(super) fn whatweb() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "whatweb",
        ToolCategory::WebScan,
        "Identify the technologies behind a website",
    )
    .with_parameter(ParameterSpec::required(
        "target",
        "Site URL (e.g. https://example.com)",
    ))
    .with_parameter(
        ParameterSpec::optional("aggression", "1 = stealthy, 3 = aggressive, 4 = heavy")
            .with_type(ParamType::Integer)
            .with_default(1i64),
    )
    .with_parameter(
        ParameterSpec::optional("verbose", "Detailed output")
            .with_type(ParamType::Flag)
            .with_default(true),
    )
    .with_timeout_secs(120);

    let binding = ToolBinding::new(
        |params: &ValidatedParams| -> Result<CommandLine, BuildError> {
            let aggression = int_in(params, "aggression", 1..=4)?;
            Ok(CommandLine::new("whatweb")
                .arg("-a")
                .arg(aggression.to_string())
                .arg_if(params.get_bool("verbose").unwrap_or(true), "-v")
                .arg(operand(params, "target")?))
        },
    );

    BuiltinTool::new(descriptor, binding, "whatweb")
}

pub(super) fn gobuster(paths: Arc<ToolPaths>) -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "gobuster",
        ToolCategory::WebScan,
        "Brute force directories, DNS subdomains or virtual hosts",
    )
    .with_parameter(
        ParameterSpec::optional("mode", "dir, dns or vhost")
            .choice(GOBUSTER_MODES)
            .with_default("dir"),
    )
    .with_parameter(ParameterSpec::required(
        "target",
        "URL for dir/vhost, domain for dns",
    ))
    .with_parameter(
        ParameterSpec::optional("wordlist", "common, medium, big, dns or a file path")
            .with_default("common"),
    )
    .with_parameter(
        ParameterSpec::optional("extensions", "File extensions for dir mode")
            .with_default("php,html,txt"),
    )
    .with_parameter(
        ParameterSpec::optional("threads", "Concurrent threads")
            .with_type(ParamType::Integer)
            .with_default(10i64),
    )
    .with_timeout_secs(600);

    let binding = ToolBinding::new(
        move |params: &ValidatedParams| -> Result<CommandLine, BuildError> {
            let mode = choice(params, "mode")?;
            let target = operand(params, "target")?;
            let wordlist = paths.resolve_wordlist(operand(params, "wordlist")?);
            let threads = int_in(params, "threads", 1..=200)?;

            let cmd = CommandLine::new("gobuster").arg(mode);
            let cmd = match mode {
                "dns" => cmd.arg("-d").arg(target),
                _ => cmd.arg("-u").arg(target),
            };
            let cmd = cmd.arg("-w").arg(wordlist.to_string_lossy());
            let cmd = if mode == "dir" {
                let extensions = params.non_empty_str("extensions").unwrap_or("php,html,txt");
                if extensions.starts_with('-') {
                    return Err(BuildError::invalid("extensions", "must not start with '-'"));
                }
                cmd.arg("-x").arg(extensions)
            } else {
                cmd
            };
            Ok(cmd.arg("-t").arg(threads.to_string()))
        },
    );

    BuiltinTool::new(descriptor, binding, "gobuster")
}

pub(super) fn nikto() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "nikto",
        ToolCategory::WebScan,
        "Scan a web server for dangerous files, misconfigurations and outdated software",
    )
    .with_parameter(ParameterSpec::required(
        "target",
        "Host or URL (e.g. http://example.com)",
    ))
    .with_parameter(
        ParameterSpec::optional("port", "Port to scan")
            .with_type(ParamType::Integer)
            .with_default(80i64),
    )
    .with_parameter(
        ParameterSpec::optional("ssl", "Force SSL/TLS")
            .with_type(ParamType::Flag)
            .with_default(false),
    )
    .with_parameter(
        ParameterSpec::optional("tuning", "Test classes: 0-9, a-c or x (e.g. 1234)")
            .with_default("1234"),
    )
    .with_timeout_secs(600);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        let port = int_in(params, "port", 1..=65535)?;
        let tuning = params.non_empty_str("tuning").unwrap_or("1234");
        if !tuning
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, 'a'..='c' | 'x'))
        {
            return Err(BuildError::invalid(
                "tuning",
                format!("'{}' is not a set of tuning classes", tuning),
            ));
        }
        Ok(CommandLine::new("nikto")
            .arg("-h")
            .arg(operand(params, "target")?)
            .arg("-p")
            .arg(port.to_string())
            .arg_if(params.get_bool("ssl").unwrap_or(false), "-ssl")
            .arg("-Tuning")
            .arg(tuning))
    });

    BuiltinTool::new(descriptor, binding, "nikto")
}

pub(super) fn wpscan() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "wpscan",
        ToolCategory::WebScan,
        "WordPress vulnerability scanner",
    )
    .with_parameter(ParameterSpec::required("url", "WordPress site URL"))
    .with_parameter(
        ParameterSpec::optional(
            "enumerate",
            "What to enumerate: p plugins, t themes, u users, vp vulnerable plugins",
        )
        .with_default("vp,vt,u"),
    )
    .with_parameter(ParameterSpec::optional(
        "api_token",
        "WPScan API token for vulnerability data",
    ))
    .with_timeout_secs(600);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        let enumerate = operand(params, "enumerate")?;
        if !enumerate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ',' || c == '-')
        {
            return Err(BuildError::invalid(
                "enumerate",
                format!("'{}' is not an enumeration list", enumerate),
            ));
        }
        let mut cmd = CommandLine::new("wpscan")
            .arg("--url")
            .arg(operand(params, "url")?)
            .arg("--enumerate")
            .arg(enumerate);
        if let Some(token) = optional_operand(params, "api_token")? {
            cmd.push("--api-token");
            cmd.push(token);
        }
        Ok(cmd)
    });

    BuiltinTool::new(descriptor, binding, "wpscan")
}
