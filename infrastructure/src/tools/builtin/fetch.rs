//! Tools that bring things onto the host: file downloads, repository
//! clones and package installs.

use std::path::PathBuf;
use std::sync::Arc;

use toolbench_domain::tool::{
    BuildError, CommandLine, ParameterSpec, ToolBinding, ToolCategory, ToolDescriptor,
    ValidatedParams,
};

use super::{BuiltinTool, choice, operand, optional_operand};
use crate::tools::artifacts::{ClonedRepository, DownloadedFile};
use crate::tools::paths::ToolPaths;

pub const DOWNLOAD_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];

pub const PACKAGE_MANAGERS: [&str; 6] = ["apt", "pip", "pip3", "gem", "cargo", "npm"];

pub(super) fn download(paths: Arc<ToolPaths>) -> BuiltinTool {
    let descriptor = ToolDescriptor::new("download", ToolCategory::Utilities, "Download a file")
        .with_binary("wget")
        .with_parameter(ParameterSpec::required("url", "http(s) or ftp URL"))
        .with_parameter(ParameterSpec::optional(
            "output",
            "Destination path (default: under the artifact directory)",
        ))
        .with_timeout_secs(600);

    let binding = ToolBinding::new(
        move |params: &ValidatedParams| -> Result<CommandLine, BuildError> {
            let url = operand(params, "url")?;
            if !DOWNLOAD_SCHEMES.iter().any(|s| url.starts_with(s)) {
                return Err(BuildError::invalid(
                    "url",
                    format!("scheme must be one of {}", DOWNLOAD_SCHEMES.join(", ")),
                ));
            }
            let output = match optional_operand(params, "output")? {
                Some(path) => PathBuf::from(path),
                None => paths.download_target(url),
            };
            Ok(CommandLine::new("wget")
                .arg("-O")
                .arg(output.to_string_lossy())
                .arg(url)
                .with_artifact(output))
        },
    )
    .with_post_processor(DownloadedFile);

    BuiltinTool::new(descriptor, binding, "wget")
}

pub(super) fn git_clone(paths: Arc<ToolPaths>) -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "git_clone",
        ToolCategory::Utilities,
        "Clone a git repository",
    )
    .with_binary("git")
    .with_parameter(ParameterSpec::required("repo", "Repository URL"))
    .with_parameter(ParameterSpec::optional(
        "dest",
        "Target directory (default: under the artifact directory)",
    ))
    .with_timeout_secs(1800);

    let binding = ToolBinding::new(
        move |params: &ValidatedParams| -> Result<CommandLine, BuildError> {
            let repo = operand(params, "repo")?;
            if repo.starts_with("ext::") {
                return Err(BuildError::invalid("repo", "ext:: transports are not allowed"));
            }
            let dest = match optional_operand(params, "dest")? {
                Some(path) => PathBuf::from(path),
                None => paths.clone_target(repo),
            };
            Ok(CommandLine::new("git")
                .arg("clone")
                .arg(repo)
                .arg(dest.to_string_lossy())
                .with_artifact(dest))
        },
    )
    .with_post_processor(ClonedRepository);

    BuiltinTool::new(descriptor, binding, "git")
}

pub(super) fn install_package() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "install_package",
        ToolCategory::Utilities,
        "Install a package with a system or language package manager",
    )
    .with_binary("apt-get")
    .with_parameter(ParameterSpec::required("package", "Package name"))
    .with_parameter(
        ParameterSpec::optional("manager", "Package manager")
            .choice(PACKAGE_MANAGERS)
            .with_default("apt"),
    )
    .with_timeout_secs(1800);

    let binding = ToolBinding::new(
        |params: &ValidatedParams| -> Result<CommandLine, BuildError> {
            let package = operand(params, "package")?;
            if !package
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-_.+@/:=<>~".contains(c))
            {
                return Err(BuildError::invalid(
                    "package",
                    format!("'{}' is not a package name", package),
                ));
            }

            let cmd = match choice(params, "manager")? {
                "apt" => CommandLine::new("apt-get").args(["install", "-y"]),
                "pip" => CommandLine::new("pip").arg("install"),
                "pip3" => CommandLine::new("pip3").arg("install"),
                "gem" => CommandLine::new("gem").arg("install"),
                "cargo" => CommandLine::new("cargo").arg("install"),
                "npm" => CommandLine::new("npm").args(["install", "-g"]),
                other => {
                    return Err(BuildError::invalid(
                        "manager",
                        format!("unsupported package manager '{}'", other),
                    ));
                }
            };
            Ok(cmd.arg(package))
        },
    );

    BuiltinTool::new(descriptor, binding, "apt")
}
