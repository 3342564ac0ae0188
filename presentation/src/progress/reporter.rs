//! Live progress for dispatches, drawn on stderr

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use toolbench_application::DispatchObserver;
use toolbench_domain::execution::{DispatchState, ExecutionId, ExecutionReport};
use toolbench_domain::tool::CommandLine;

const TICK: Duration = Duration::from_millis(120);

/// Shows one spinner per running process.
///
/// The report itself goes to stdout; the spinners go to stderr so that
/// `--output json` stays machine-readable. indicatif hides them when
/// stderr is not a terminal.
pub struct DispatchProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<ExecutionId, ProgressBar>>,
    verbose: bool,
}

impl DispatchProgress {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// Also print every state transition
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: Mutex::new(HashMap::new()),
            verbose: false,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn finished_message(report: &ExecutionReport) -> String {
        let mark = if report.success {
            "✓".green()
        } else {
            "✗".red()
        };
        let status = match report.failure_reason {
            Some(reason) => format!(" ({})", reason),
            None => String::new(),
        };
        format!(
            "{} {} finished in {}ms{}",
            mark, report.tool_id, report.duration_ms, status
        )
    }

    fn println(&self, line: String) {
        let _ = self.multi.println(line);
    }
}

impl Default for DispatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchObserver for DispatchProgress {
    fn on_transition(&self, id: ExecutionId, tool_id: &str, state: DispatchState) {
        match state {
            DispatchState::Errored { reason } if !self.verbose => {
                // Validation errors never reach on_process_start, so say
                // something even when not verbose.
                if reason.is_some_and(|r| r.is_validation()) {
                    self.println(format!(
                        "{} {} {} rejected",
                        "✗".red(),
                        id.to_string().dimmed(),
                        tool_id
                    ));
                }
            }
            _ if self.verbose => {
                self.println(format!(
                    "  {} {} {}",
                    id.to_string().dimmed(),
                    tool_id,
                    state.name().dimmed()
                ));
            }
            _ => {}
        }
    }

    fn on_process_start(&self, id: ExecutionId, command: &CommandLine) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(Self::spinner_style());
        bar.set_prefix(id.to_string());
        bar.set_message(command.to_string());
        bar.enable_steady_tick(TICK);

        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(id, bar);
        }
    }

    fn on_report(&self, id: ExecutionId, report: &ExecutionReport) {
        let bar = self.bars.lock().ok().and_then(|mut bars| bars.remove(&id));
        let message = Self::finished_message(report);
        match bar {
            Some(bar) => bar.finish_with_message(message),
            // Rejected before a process started
            None if self.verbose => {
                self.println(format!("  {} {}", id.to_string().dimmed(), message))
            }
            None => {}
        }
    }
}
