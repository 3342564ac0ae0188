//! Local process supervisor.
//!
//! [`LocalProcessSupervisor`] runs an argument vector directly (no shell)
//! as a tokio child process:
//!
//! - stdout and stderr are drained concurrently into bounded buffers; bytes
//!   past the cap are read and discarded so the child never blocks on a
//!   full pipe
//! - the wait races the timeout and the cancellation token
//! - termination is SIGTERM to the child's process group, then SIGKILL
//!   after the grace period
//!
//! On Linux the child is placed in its own process group and asks the
//! kernel for SIGTERM if we die (`PR_SET_PDEATHSIG`).

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use toolbench_application::ports::process_supervisor::{ProcessSupervisorPort, SupervisorError};
use toolbench_domain::execution::{CapturedStream, ExecutionId, ExecutionOutcome, ExecutionRequest};
use tracing::{debug, trace, warn};

/// Per-stream capture cap (1 MB)
pub const DEFAULT_OUTPUT_CAP: usize = 1024 * 1024;

/// Time between SIGTERM and SIGKILL
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(2);

/// Floor for how long we keep draining pipes after the child is gone.
const MIN_DRAIN_WAIT: Duration = Duration::from_millis(200);

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorSettings {
    pub output_cap_bytes: usize,
    pub kill_grace: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            output_cap_bytes: DEFAULT_OUTPUT_CAP,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }
}

impl SupervisorSettings {
    pub fn with_output_cap(mut self, bytes: usize) -> Self {
        self.output_cap_bytes = bytes;
        self
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }
}

/// How the wait for the child ended.
enum Ending {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

/// Supervisor that runs processes on the local host.
///
/// Holds no per-execution state; concurrent `run` calls are independent.
#[derive(Debug, Clone, Default)]
pub struct LocalProcessSupervisor {
    settings: SupervisorSettings,
}

impl LocalProcessSupervisor {
    pub fn new(settings: SupervisorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    fn command(&self, request: &ExecutionRequest) -> Command {
        let mut cmd = Command::new(&request.command.program);
        cmd.args(&request.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }

        // Linux: own process group so termination reaches grandchildren,
        // and SIGTERM from the kernel if this process dies first.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::setpgid(0, 0);
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }

    /// SIGTERM, wait up to the grace period, then SIGKILL.
    async fn terminate(&self, child: &mut Child, id: ExecutionId) {
        signal_group(child, Signal::Term);

        match tokio::time::timeout(self.settings.kill_grace, child.wait()).await {
            Ok(_) => debug!(execution = %id, "Process exited after SIGTERM"),
            Err(_) => {
                warn!(
                    execution = %id,
                    grace_ms = self.settings.kill_grace.as_millis() as u64,
                    "Process ignored SIGTERM, killing"
                );
                signal_group(child, Signal::Kill);
                if let Err(e) = child.kill().await {
                    debug!(execution = %id, error = %e, "Kill after grace period failed");
                }
            }
        }
    }
}

#[async_trait]
impl ProcessSupervisorPort for LocalProcessSupervisor {
    async fn run(
        &self,
        request: ExecutionRequest,
        cancel: CancellationToken,
    ) -> Result<ExecutionOutcome, SupervisorError> {
        let program = request.command.program.clone();

        if let Some(dir) = &request.working_dir {
            let is_dir = tokio::fs::metadata(dir)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                return Err(SupervisorError::Spawn {
                    program,
                    message: format!("working directory does not exist: {}", dir.display()),
                });
            }
        }

        let start = Instant::now();
        let mut child = self
            .command(&request)
            .spawn()
            .map_err(|e| spawn_error(&program, e))?;
        debug!(
            execution = %request.id,
            pid = child.id().unwrap_or_default(),
            program = %program,
            "Spawned process"
        );

        let cap = self.settings.output_cap_bytes;
        let stdout = Arc::new(Mutex::new(CapturedStream::default()));
        let stderr = Arc::new(Mutex::new(CapturedStream::default()));
        let stdout_task = tokio::spawn(capture(child.stdout.take(), cap, Arc::clone(&stdout)));
        let stderr_task = tokio::spawn(capture(child.stderr.take(), cap, Arc::clone(&stderr)));

        let ending = tokio::select! {
            status = child.wait() => match status {
                Ok(status) => Ending::Exited(status),
                Err(e) => {
                    stdout_task.abort();
                    stderr_task.abort();
                    return Err(SupervisorError::Wait { program, message: e.to_string() });
                }
            },
            _ = tokio::time::sleep(request.timeout) => Ending::TimedOut,
            _ = cancel.cancelled() => Ending::Cancelled,
        };

        let (exit_code, timed_out, cancelled) = match ending {
            Ending::Exited(status) => (status.code(), false, false),
            Ending::TimedOut => {
                debug!(
                    execution = %request.id,
                    timeout_secs = request.timeout.as_secs_f64(),
                    "Process timed out"
                );
                self.terminate(&mut child, request.id).await;
                (None, true, false)
            }
            Ending::Cancelled => {
                debug!(execution = %request.id, "Process cancelled");
                self.terminate(&mut child, request.id).await;
                (None, false, true)
            }
        };

        // A surviving grandchild can hold the pipes open; don't wait on it forever.
        let drain_wait = self.settings.kill_grace.max(MIN_DRAIN_WAIT);
        for task in [stdout_task, stderr_task] {
            let abort = task.abort_handle();
            if tokio::time::timeout(drain_wait, task).await.is_err() {
                trace!(execution = %request.id, "Output pipe still open, abandoning drain");
                abort.abort();
            }
        }

        Ok(ExecutionOutcome {
            exit_code,
            stdout: take_stream(&stdout),
            stderr: take_stream(&stderr),
            elapsed: start.elapsed(),
            timed_out,
            cancelled,
        })
    }
}

/// Read `reader` to EOF, keeping at most `cap` bytes in `sink`.
async fn capture<R>(reader: Option<R>, cap: usize, sink: Arc<Mutex<CapturedStream>>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return;
    };
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let Ok(mut stream) = sink.lock() else {
                    break;
                };
                stream.total_bytes += n as u64;
                let room = cap.saturating_sub(stream.bytes.len());
                let keep = room.min(n);
                stream.bytes.extend_from_slice(&buf[..keep]);
                if keep < n {
                    stream.truncated = true;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "Output pipe read failed");
                break;
            }
        }
    }
}

fn take_stream(sink: &Mutex<CapturedStream>) -> CapturedStream {
    sink.lock()
        .map(|mut s| std::mem::take(&mut *s))
        .unwrap_or_default()
}

fn spawn_error(program: &str, e: io::Error) -> SupervisorError {
    if e.kind() == io::ErrorKind::NotFound {
        SupervisorError::ProgramNotFound {
            program: program.to_string(),
        }
    } else {
        SupervisorError::Spawn {
            program: program.to_string(),
            message: e.to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Signal {
    Term,
    Kill,
}

#[cfg(target_os = "linux")]
fn signal_group(child: &mut Child, signal: Signal) {
    let Some(pid) = child.id() else {
        return;
    };
    let sig = match signal {
        Signal::Term => libc::SIGTERM,
        Signal::Kill => libc::SIGKILL,
    };
    // Negative pid addresses the process group created in pre_exec.
    unsafe {
        libc::kill(-(pid as libc::pid_t), sig);
    }
}

#[cfg(not(target_os = "linux"))]
fn signal_group(child: &mut Child, _signal: Signal) {
    let _ = child.start_kill();
}
