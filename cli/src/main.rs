//! CLI entrypoint for toolbench
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use toolbench_application::{Dispatcher, HandleRequestUseCase, RequestOutcome};
use toolbench_domain::tool::Intent;
use toolbench_infrastructure::{
    BuiltinTool, ConfigLoader, FileConfig, FileOutputFormat, JsonlExecutionLogger,
    LocalProcessSupervisor, Severity, StructuredIntentInterpreter, assemble_toolset,
    builtin_tools, discover_tools,
};
use toolbench_presentation::{
    Cli, Command, ConfigArgs, ConfigIssueRow, ConfigSourceRow, ConsoleFormatter, DispatchProgress,
    MissingToolRow, OutputFormat, ToolRow, ToolsArgs,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Exit code for a failed report, a validation error or a clarification
const EXIT_FAILED: u8 = 1;
/// Exit code for fatal errors (bad config, process creation failure)
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprint!("{}", ConsoleFormatter::format_error(&format!("{:#}", err)));
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// A request handed to the dispatcher
enum Request {
    /// Already structured (`toolbench run`)
    Structured(Intent),
    /// Goes through the interpreter (`toolbench intent`)
    Text(String),
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    let log_file = cli.log_file.clone().or_else(|| config.logging.file.clone());
    let _log_guard = init_logging(cli.verbose, log_file.as_deref())?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let format = cli.output.unwrap_or(match config.output.format {
        FileOutputFormat::Text => OutputFormat::Text,
        FileOutputFormat::Json => OutputFormat::Json,
    });

    let tools = builtin_tools(&config.paths.tool_paths());

    match cli.command {
        Command::Config(args) => Ok(show_config(&args, cli.config.as_deref(), &config, &tools)),
        Command::Discover => Ok(discover(&tools, format)),
        Command::Tools(args) => Ok(list_tools(&args, &config, &tools, format)),
        Command::Run(args) => {
            report_config_issues(&config, &tools);
            let request = Request::Structured(args.to_intent());
            dispatch(request, &config, tools, format, cli.quiet, cli.verbose).await
        }
        Command::Intent { json } => {
            report_config_issues(&config, &tools);
            dispatch(Request::Text(json), &config, tools, format, cli.quiet, cli.verbose).await
        }
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins unless -v was given
    let filter = if verbose == 0
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        filter
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"), // -vvv or more
        }
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn report_config_issues(config: &FileConfig, tools: &[BuiltinTool]) {
    let known: Vec<&str> = tools.iter().map(|t| t.descriptor.id.as_str()).collect();
    for issue in config.validate(&known) {
        warn!("Config: {}", issue.message);
    }
}

async fn dispatch(
    request: Request,
    config: &FileConfig,
    tools: Vec<BuiltinTool>,
    format: OutputFormat,
    quiet: bool,
    verbose: u8,
) -> Result<ExitCode> {
    let tools = if config.tools.only_installed {
        let discovery = discover_tools(&tools);
        tools
            .into_iter()
            .filter(|t| discovery.is_installed(&t.descriptor.id))
            .collect()
    } else {
        tools
    };

    let paths = config.paths.tool_paths();
    paths.ensure_artifact_dir().with_context(|| {
        format!(
            "Failed to create artifact directory {}",
            paths.artifact_dir.display()
        )
    })?;

    // === Dependency Injection ===
    let (catalog, bindings) = assemble_toolset(tools, &config.tools.disabled)?;
    let supervisor = Arc::new(LocalProcessSupervisor::new(
        config.dispatch.supervisor_settings(),
    ));

    let mut dispatcher = Dispatcher::new(Arc::new(catalog), Arc::new(bindings), supervisor)
        .with_params(config.execution_params());
    if !quiet {
        dispatcher =
            dispatcher.with_observer(Arc::new(DispatchProgress::new().verbose(verbose > 0)));
    }
    let dispatcher = Arc::new(dispatcher);

    let mut use_case = HandleRequestUseCase::new(Arc::clone(&dispatcher))
        .with_interpreter(Arc::new(StructuredIntentInterpreter::new()));
    if let Some(path) = &config.logging.execution_log
        && let Some(logger) = JsonlExecutionLogger::new(path)
    {
        use_case = use_case.with_execution_logger(Arc::new(logger));
    }

    // Ctrl-C cancels whatever is running; the report still comes back
    let interrupt = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let cancelled = dispatcher.cancel_all();
                warn!("Interrupted, cancelled {} execution(s)", cancelled);
            }
        })
    };

    let outcome = match request {
        Request::Structured(intent) => {
            info!("Dispatching {}", intent.tool_id);
            use_case
                .execute_intent(&intent)
                .await
                .map(RequestOutcome::Report)
        }
        Request::Text(text) => use_case.execute(&text, &[]).await,
    };
    interrupt.abort();

    match outcome? {
        RequestOutcome::Report(report) => {
            match format {
                OutputFormat::Text => print!("{}", ConsoleFormatter::format_report(&report)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&report)),
            }
            Ok(if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_FAILED)
            })
        }
        RequestOutcome::Clarification(clarification) => {
            match format {
                OutputFormat::Text => {
                    print!("{}", ConsoleFormatter::format_clarification(&clarification))
                }
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&clarification)),
            }
            Ok(ExitCode::from(EXIT_FAILED))
        }
    }
}

fn list_tools(
    args: &ToolsArgs,
    config: &FileConfig,
    tools: &[BuiltinTool],
    format: OutputFormat,
) -> ExitCode {
    let discovery = discover_tools(tools);

    let rows: Vec<ToolRow<'_>> = tools
        .iter()
        .filter(|t| !config.tools.disabled.contains(&t.descriptor.id))
        .filter(|t| args.category.is_none_or(|c| t.descriptor.category == c))
        .map(|t| ToolRow {
            descriptor: &t.descriptor,
            installed: discovery.is_installed(&t.descriptor.id),
        })
        .filter(|row| args.all || row.installed)
        .collect();

    match format {
        OutputFormat::Text => print!("{}", ConsoleFormatter::format_tools(&rows)),
        OutputFormat::Json => {
            let descriptors: Vec<_> = rows.iter().map(|r| r.descriptor).collect();
            println!("{}", ConsoleFormatter::format_json(&descriptors));
        }
    }
    ExitCode::SUCCESS
}

fn discover(tools: &[BuiltinTool], format: OutputFormat) -> ExitCode {
    let result = discover_tools(tools);

    match format {
        OutputFormat::Text => {
            let missing: Vec<MissingToolRow<'_>> = result
                .missing
                .iter()
                .map(|t| MissingToolRow {
                    id: &t.id,
                    binary: &t.binary,
                    install_hint: &t.install_hint,
                })
                .collect();
            print!(
                "{}",
                ConsoleFormatter::format_discovery(&result.installed_by_category(), &missing)
            );
        }
        OutputFormat::Json => {
            let installed: Vec<&str> = result.installed.iter().map(|t| t.id.as_str()).collect();
            let missing: Vec<&str> = result.missing.iter().map(|t| t.id.as_str()).collect();
            println!(
                "{}",
                ConsoleFormatter::format_json(&serde_json::json!({
                    "installed": installed,
                    "missing": missing,
                }))
            );
        }
    }
    ExitCode::SUCCESS
}

fn show_config(
    args: &ConfigArgs,
    explicit: Option<&Path>,
    config: &FileConfig,
    tools: &[BuiltinTool],
) -> ExitCode {
    let show_sources = args.sources || !args.validate;
    let mut code = ExitCode::SUCCESS;

    if show_sources {
        let sources = ConfigLoader::sources(explicit);
        let rows: Vec<ConfigSourceRow<'_>> = sources
            .iter()
            .map(|s| ConfigSourceRow {
                label: s.label,
                location: s.path.as_deref(),
                found: s.found,
            })
            .collect();
        print!("{}", ConsoleFormatter::format_config_sources(&rows));
    }

    if args.validate {
        let known: Vec<&str> = tools.iter().map(|t| t.descriptor.id.as_str()).collect();
        let issues = config.validate(&known);
        let rows: Vec<ConfigIssueRow<'_>> = issues
            .iter()
            .map(|i| ConfigIssueRow {
                is_error: i.severity == Severity::Error,
                message: &i.message,
            })
            .collect();
        if show_sources {
            println!();
        }
        print!("{}", ConsoleFormatter::format_config_issues(&rows));
        if rows.iter().any(|r| r.is_error) {
            code = ExitCode::from(EXIT_FAILED);
        }
    }

    code
}
