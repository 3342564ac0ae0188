//! Built-in tools for the dispatcher
//!
//! - `builtin`: descriptors and command builders for every shipped tool
//! - `artifacts`: post-processors that read files tools produce
//! - `discovery`: probes the host for tool binaries
//! - `paths`: artifact directory and wordlist aliases

pub mod artifacts;
pub mod builtin;
pub mod discovery;
pub mod paths;

pub use builtin::{BuiltinTool, builtin_tools};
pub use discovery::{DetectedTool, DiscoveryResult, MissingTool, discover_tools, discover_with};
pub use paths::{DEFAULT_ARTIFACT_DIR, ToolPaths};

use toolbench_domain::tool::{BuilderTable, CatalogError, ToolCatalog};
use tracing::debug;

/// Register `tools` into a fresh catalog and builder table, skipping any
/// whose id is in `disabled`.
pub fn assemble_toolset(
    tools: Vec<BuiltinTool>,
    disabled: &[String],
) -> Result<(ToolCatalog, BuilderTable), CatalogError> {
    let catalog = ToolCatalog::new();
    let bindings = BuilderTable::new();

    for tool in tools {
        if disabled.iter().any(|d| d == &tool.descriptor.id) {
            debug!(tool = %tool.descriptor.id, "Tool disabled by configuration");
            continue;
        }
        let id = tool.descriptor.id.clone();
        catalog.register(tool.descriptor)?;
        bindings.insert(id, tool.binding);
    }

    Ok((catalog, bindings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_toolset() {
        let tools = builtin_tools(&ToolPaths::default());
        let (catalog, bindings) =
            assemble_toolset(tools, &["install_package".to_string()]).unwrap();

        assert_eq!(catalog.len(), 19);
        assert_eq!(bindings.len(), 19);
        assert!(!catalog.contains("install_package"));
        assert!(bindings.contains("nmap"));
        assert_eq!(catalog.list().unwrap()[0].id, "echo_test");
    }

    #[test]
    fn test_assemble_rejects_duplicates() {
        let mut tools = builtin_tools(&ToolPaths::default());
        tools.push(tools[0].clone());
        let err = assemble_toolset(tools, &[]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTool(id) if id == "echo_test"));
    }

    #[cfg(unix)]
    mod end_to_end {
        use super::*;
        use crate::process::{LocalProcessSupervisor, SupervisorSettings};
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::{Duration, Instant};
        use toolbench_application::Dispatcher;
        use toolbench_domain::execution::FailureReason;
        use toolbench_domain::tool::{
            BuildError, CommandLine, Intent, ToolBinding, ToolCategory, ToolDescriptor,
            ValidatedParams,
        };

        fn dispatcher() -> Dispatcher {
            dispatcher_with(&ToolPaths::default())
        }

        fn dispatcher_with(paths: &ToolPaths) -> Dispatcher {
            let (catalog, bindings) = assemble_toolset(builtin_tools(paths), &[]).unwrap();
            Dispatcher::new(
                Arc::new(catalog),
                Arc::new(bindings),
                Arc::new(LocalProcessSupervisor::new(SupervisorSettings::default())),
            )
        }

        #[tokio::test]
        async fn test_echo_round_trip() {
            let report = dispatcher()
                .dispatch(&Intent::new("echo_test").with_param("message", "hello"))
                .await
                .unwrap();

            assert!(report.success, "{}", report.summary);
            assert_eq!(report.exit_code, Some(0));
            assert!(report.raw_output.contains("hello"));
            assert!(report.summary.contains("hello"));
            assert!(report.execution_id.is_some());
        }

        #[tokio::test]
        async fn test_shell_metacharacters_are_echoed_literally() {
            let message = "hi; echo pwned && $(id)";
            let report = dispatcher()
                .dispatch(&Intent::new("echo_test").with_param("message", message))
                .await
                .unwrap();

            assert!(report.success);
            assert_eq!(report.raw_output.trim_end(), message);
        }

        #[tokio::test]
        async fn test_installed_tool_times_out() {
            let dispatcher = dispatcher();
            install_sleeper(&dispatcher, "5", 1);

            let started = Instant::now();
            let report = dispatcher
                .dispatch(&Intent::new("sleeper"))
                .await
                .unwrap();

            assert!(!report.success);
            assert_eq!(report.failure_reason, Some(FailureReason::TimedOut));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        fn install_sleeper(dispatcher: &Dispatcher, seconds: &'static str, timeout_secs: u64) {
            let descriptor = ToolDescriptor::new("sleeper", ToolCategory::Utilities, "Sleep")
                .with_binary("sleep")
                .with_timeout_secs(timeout_secs);
            let binding =
                ToolBinding::new(move |_: &ValidatedParams| -> Result<CommandLine, BuildError> {
                    Ok(CommandLine::new("sleep").arg(seconds))
                });
            dispatcher.install_tool(descriptor, binding).unwrap();
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
        async fn test_concurrent_dispatches_are_independent() {
            let dispatcher = Arc::new(dispatcher());
            install_sleeper(&dispatcher, "1", 10);
            let finished = AtomicUsize::new(0);

            let slow = async {
                let report = dispatcher.dispatch(&Intent::new("sleeper")).await.unwrap();
                (report, finished.fetch_add(1, Ordering::SeqCst))
            };
            let fast = async {
                let report = dispatcher
                    .dispatch(&Intent::new("echo_test").with_param("message", "quick"))
                    .await
                    .unwrap();
                (report, finished.fetch_add(1, Ordering::SeqCst))
            };
            let ((slow, slow_order), (fast, fast_order)) = tokio::join!(slow, fast);

            assert_eq!(fast_order, 0, "echo should not wait for the sleeper");
            assert_eq!(slow_order, 1);
            assert!(fast.success, "{}", fast.summary);
            assert_eq!(fast.raw_output.trim_end(), "quick");
            assert!(slow.success, "{}", slow.summary);
            assert_eq!(slow.tool_id, "sleeper");
            assert!(slow.duration_ms >= 900);
            assert_ne!(fast.execution_id, slow.execution_id);
            assert!(dispatcher.in_flight().is_empty());
        }

        #[tokio::test]
        async fn test_derived_artifact_path_is_writable_once_prepared() {
            let temp = tempfile::tempdir().unwrap();
            let paths = ToolPaths::default()
                .with_artifact_dir(temp.path().join("fresh").join("toolbench_artifacts"));
            paths.ensure_artifact_dir().unwrap();

            let dispatcher = dispatcher_with(&paths);
            let target = paths.download_target("http://127.0.0.1:9/file.txt");
            let descriptor = ToolDescriptor::new("toucher", ToolCategory::Utilities, "Touch")
                .with_binary("touch");
            let command = CommandLine::new("touch").arg(target.display().to_string());
            let binding =
                ToolBinding::new(move |_: &ValidatedParams| -> Result<CommandLine, BuildError> {
                    Ok(command.clone())
                });
            dispatcher.install_tool(descriptor, binding).unwrap();

            let report = dispatcher
                .dispatch(&Intent::new("toucher"))
                .await
                .unwrap();
            assert!(report.success, "{}", report.summary);
            assert!(target.is_file());
        }

        #[tokio::test]
        async fn test_json_intent_for_unknown_tool_is_an_unknown_tool_report() {
            use crate::interpreter::StructuredIntentInterpreter;
            use toolbench_application::{HandleRequestUseCase, RequestOutcome};

            let use_case = HandleRequestUseCase::new(Arc::new(dispatcher()))
                .with_interpreter(Arc::new(StructuredIntentInterpreter::new()));
            let outcome = use_case
                .execute(r#"{"toolId":"nope","parameters":{"target":"x"}}"#, &[])
                .await
                .unwrap();

            match outcome {
                RequestOutcome::Report(report) => {
                    assert!(!report.success);
                    assert_eq!(report.tool_id, "nope");
                    assert_eq!(report.failure_reason, Some(FailureReason::UnknownTool));
                    assert_eq!(report.exit_code, None);
                }
                other => panic!("expected report, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_missing_binary_is_a_failed_report() {
            let dispatcher = dispatcher();
            let descriptor =
                ToolDescriptor::new("ghost", ToolCategory::Utilities, "Not installed anywhere")
                    .with_binary("toolbench-no-such-binary");
            let binding =
                ToolBinding::new(|_: &ValidatedParams| -> Result<CommandLine, BuildError> {
                    Ok(CommandLine::new("toolbench-no-such-binary"))
                });
            dispatcher.install_tool(descriptor, binding).unwrap();

            let report = dispatcher
                .dispatch(&Intent::new("ghost"))
                .await
                .unwrap();
            assert_eq!(report.failure_reason, Some(FailureReason::ProcessNotFound));
        }
    }
}
