//! Result normalization
//!
//! [`ResultNormalizer`] converts an [`ExecutionOutcome`] into an
//! [`ExecutionReport`]. Classification:
//!
//! | Outcome | success | failure_reason |
//! |---------|---------|----------------|
//! | cancelled | false | `Cancelled` |
//! | timed out | false | `TimedOut` |
//! | exit 0 | true | - |
//! | other exit / killed by signal | false | `NonZeroExit` |
//!
//! Truncated capture is a warning, never a failure. On success an optional
//! [`PostProcessor`] may read the artifact the tool produced; its errors
//! only add an `ArtifactUnavailable` warning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::report::{ExecutionReport, Extras, FailureReason, ReportWarning};
use super::request::{CapturedStream, ExecutionOutcome};
use crate::tool::value_objects::ValidatedParams;
use crate::util::{head_preview, tail_preview};

const STDERR_SEPARATOR: &str = "\n--- stderr ---\n";

/// Best-effort failure to read a tool-produced artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    #[error("no artifact path for this execution")]
    NoArtifact,

    #[error("expected artifact not found: {0}")]
    Missing(PathBuf),

    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// Derives extra facts from a tool's artifact after a successful run.
///
/// This is the one place normalization may touch the filesystem, and it
/// does so at most once per execution.
pub trait PostProcessor: Send + Sync {
    fn process(
        &self,
        artifact: Option<&Path>,
        params: &ValidatedParams,
    ) -> Result<Extras, ArtifactError>;
}

/// Builds reports from raw outcomes.
#[derive(Debug, Clone)]
pub struct ResultNormalizer {
    preview_lines: usize,
    preview_bytes: usize,
    failure_tail_lines: usize,
}

impl Default for ResultNormalizer {
    fn default() -> Self {
        Self {
            preview_lines: 20,
            preview_bytes: 2000,
            failure_tail_lines: 5,
        }
    }
}

impl ResultNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview(mut self, lines: usize, bytes: usize) -> Self {
        self.preview_lines = lines;
        self.preview_bytes = bytes;
        self
    }

    pub fn normalize(
        &self,
        tool_id: &str,
        outcome: &ExecutionOutcome,
        params: &ValidatedParams,
        artifact: Option<&Path>,
        post: Option<&dyn PostProcessor>,
    ) -> ExecutionReport {
        let stdout = outcome.stdout.text();
        let stderr = outcome.stderr.text();
        let elapsed = format_elapsed(outcome.elapsed);

        let mut report = if outcome.cancelled {
            ExecutionReport::failure(
                tool_id,
                FailureReason::Cancelled,
                format!("{} was cancelled after {}", tool_id, elapsed),
            )
        } else if outcome.timed_out {
            let mut summary = format!("{} timed out after {}", tool_id, elapsed);
            self.append_tail(&mut summary, &stdout, &stderr);
            ExecutionReport::failure(tool_id, FailureReason::TimedOut, summary)
        } else if outcome.exit_code == Some(0) {
            let (preview, cut) = head_preview(&stdout, self.preview_lines, self.preview_bytes);
            let mut summary = format!("{} completed in {}", tool_id, elapsed);
            if preview.trim().is_empty() {
                summary.push_str("\n(no output)");
            } else {
                summary.push('\n');
                summary.push_str(&preview);
                if cut {
                    summary.push_str("\n...");
                }
            }
            ExecutionReport::success(tool_id, summary)
        } else {
            let mut summary = match outcome.exit_code {
                Some(code) => format!("{} exited with code {} after {}", tool_id, code, elapsed),
                None => format!("{} was terminated by a signal after {}", tool_id, elapsed),
            };
            self.append_tail(&mut summary, &stdout, &stderr);
            ExecutionReport::failure(tool_id, FailureReason::NonZeroExit, summary)
        };

        report.exit_code = outcome.exit_code;
        report.duration_ms = outcome.elapsed.as_millis() as u64;
        report.truncated = outcome.truncated();
        report.raw_output = join_streams(&stdout, &stderr);
        report
            .warnings
            .extend(truncation_warning("stdout", &outcome.stdout));
        report
            .warnings
            .extend(truncation_warning("stderr", &outcome.stderr));

        if report.success
            && let Some(post) = post
        {
            match post.process(artifact, params) {
                Ok(extras) => report.extras.extend(extras),
                Err(e) => {
                    tracing::warn!(tool = %tool_id, error = %e, "Artifact post-processing failed");
                    report.warnings.push(ReportWarning::ArtifactUnavailable {
                        detail: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Report for a catalogued tool whose binary could not be started.
    pub fn not_found(&self, tool_id: &str, program: &str) -> ExecutionReport {
        ExecutionReport::failure(
            tool_id,
            FailureReason::ProcessNotFound,
            format!(
                "{} could not be started: program '{}' was not found on this host",
                tool_id, program
            ),
        )
    }

    fn append_tail(&self, summary: &mut String, stdout: &str, stderr: &str) {
        let source = if stderr.trim().is_empty() { stdout } else { stderr };
        let tail = tail_preview(source.trim_end(), self.failure_tail_lines);
        if !tail.is_empty() {
            summary.push('\n');
            summary.push_str(&tail);
        }
    }
}

fn truncation_warning(stream: &str, captured: &CapturedStream) -> Option<ReportWarning> {
    captured.truncated.then(|| ReportWarning::OutputTruncated {
        stream: stream.to_string(),
        captured_bytes: captured.bytes.len() as u64,
        total_bytes: captured.total_bytes,
    })
}

fn join_streams(stdout: &str, stderr: &str) -> String {
    if stderr.is_empty() {
        stdout.to_string()
    } else {
        format!("{}{}{}", stdout, STDERR_SEPARATOR, stderr)
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(exit_code: Option<i32>, stdout: &str, stderr: &str) -> ExecutionOutcome {
        ExecutionOutcome {
            exit_code,
            stdout: CapturedStream::from_bytes(stdout.as_bytes()),
            stderr: CapturedStream::from_bytes(stderr.as_bytes()),
            elapsed: Duration::from_millis(1500),
            timed_out: false,
            cancelled: false,
        }
    }

    struct CountLines;

    impl PostProcessor for CountLines {
        fn process(
            &self,
            artifact: Option<&Path>,
            _params: &ValidatedParams,
        ) -> Result<Extras, ArtifactError> {
            let path = artifact.ok_or(ArtifactError::NoArtifact)?;
            Ok(Extras::from([
                ("discovered_count".to_string(), json!(3)),
                ("output_file".to_string(), json!(path.display().to_string())),
            ]))
        }
    }

    struct Broken;

    impl PostProcessor for Broken {
        fn process(
            &self,
            artifact: Option<&Path>,
            _params: &ValidatedParams,
        ) -> Result<Extras, ArtifactError> {
            Err(ArtifactError::Missing(
                artifact.map(Path::to_path_buf).unwrap_or_default(),
            ))
        }
    }

    #[test]
    fn test_success_summary_contains_output() {
        let report = ResultNormalizer::new().normalize(
            "echo_test",
            &outcome(Some(0), "hello\n", ""),
            &ValidatedParams::new(),
            None,
            None,
        );
        assert!(report.success);
        assert!(report.failure_reason.is_none());
        assert!(report.summary.contains("hello"));
        assert!(report.summary.starts_with("echo_test completed in 1.5s"));
        assert_eq!(report.raw_output, "hello\n");
        assert_eq!(report.exit_code, Some(0));
        assert_eq!(report.duration_ms, 1500);
    }

    #[test]
    fn test_non_zero_exit_uses_stderr_tail() {
        let report = ResultNormalizer::new().normalize(
            "dig",
            &outcome(Some(9), "partial", "line1\nline2\nfatal: no servers"),
            &ValidatedParams::new(),
            None,
            None,
        );
        assert!(!report.success);
        assert_eq!(report.failure_reason, Some(FailureReason::NonZeroExit));
        assert!(report.summary.contains("exited with code 9"));
        assert!(report.summary.contains("fatal: no servers"));
        assert_eq!(report.raw_output, "partial\n--- stderr ---\nline1\nline2\nfatal: no servers");
    }

    #[test]
    fn test_killed_without_timeout_is_non_zero_exit() {
        let report = ResultNormalizer::new().normalize(
            "nmap",
            &outcome(None, "", ""),
            &ValidatedParams::new(),
            None,
            None,
        );
        assert_eq!(report.failure_reason, Some(FailureReason::NonZeroExit));
        assert!(report.summary.contains("terminated by a signal"));
    }

    #[test]
    fn test_timeout_and_cancel_classification() {
        let mut timed_out = outcome(None, "", "");
        timed_out.timed_out = true;
        let report = ResultNormalizer::new().normalize(
            "sleep",
            &timed_out,
            &ValidatedParams::new(),
            None,
            None,
        );
        assert_eq!(report.failure_reason, Some(FailureReason::TimedOut));
        assert!(report.exit_code.is_none());

        let mut cancelled = outcome(None, "", "");
        cancelled.cancelled = true;
        let report = ResultNormalizer::new().normalize(
            "sleep",
            &cancelled,
            &ValidatedParams::new(),
            None,
            None,
        );
        assert_eq!(report.failure_reason, Some(FailureReason::Cancelled));
    }

    #[test]
    fn test_truncation_is_warning_not_failure() {
        let mut o = outcome(Some(0), "aaaa", "");
        o.stdout.truncated = true;
        o.stdout.total_bytes = 4096;
        let report =
            ResultNormalizer::new().normalize("yes", &o, &ValidatedParams::new(), None, None);
        assert!(report.success);
        assert!(report.truncated);
        assert_eq!(
            report.warnings,
            vec![ReportWarning::OutputTruncated {
                stream: "stdout".into(),
                captured_bytes: 4,
                total_bytes: 4096
            }]
        );
    }

    #[test]
    fn test_post_processor_adds_extras_on_success() {
        let report = ResultNormalizer::new().normalize(
            "subfinder",
            &outcome(Some(0), "", ""),
            &ValidatedParams::new(),
            Some(Path::new("/tmp/subs.txt")),
            Some(&CountLines),
        );
        assert_eq!(report.extras["discovered_count"], 3);
        assert_eq!(report.extras["output_file"], "/tmp/subs.txt");
        assert!(report.summary.contains("(no output)"));
    }

    #[test]
    fn test_post_processor_skipped_on_failure() {
        let report = ResultNormalizer::new().normalize(
            "subfinder",
            &outcome(Some(1), "", ""),
            &ValidatedParams::new(),
            Some(Path::new("/tmp/subs.txt")),
            Some(&CountLines),
        );
        assert!(report.extras.is_empty());
    }

    #[test]
    fn test_post_processor_failure_degrades() {
        let report = ResultNormalizer::new().normalize(
            "download",
            &outcome(Some(0), "saved", ""),
            &ValidatedParams::new(),
            Some(Path::new("/nonexistent/file")),
            Some(&Broken),
        );
        assert!(report.success);
        assert!(report.extras.is_empty());
        assert!(report.has_warning(|w| matches!(w, ReportWarning::ArtifactUnavailable { .. })));
    }

    #[test]
    fn test_long_output_preview_is_cut() {
        let long: String = (0..100).map(|i| format!("line {i}\n")).collect();
        let report = ResultNormalizer::new().with_preview(3, 1000).normalize(
            "seq",
            &outcome(Some(0), &long, ""),
            &ValidatedParams::new(),
            None,
            None,
        );
        assert!(report.summary.contains("line 2"));
        assert!(!report.summary.contains("line 3\n"));
        assert!(report.summary.ends_with("..."));
        assert_eq!(report.raw_output, long);
    }

    #[test]
    fn test_not_found_report() {
        let report = ResultNormalizer::new().not_found("nmap", "nmap");
        assert_eq!(report.failure_reason, Some(FailureReason::ProcessNotFound));
        assert!(report.summary.contains("not found"));
    }
}
