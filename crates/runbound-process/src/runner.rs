//! Execution lifecycle coordination

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ExecConfig;
use crate::controller;
use crate::error::ExecError;
use crate::pump::pump;
use crate::sink::BoundedSink;

/// Exit code reported when no real exit status could be obtained
/// (start failure or cancellation).
pub const UNDETERMINED_EXIT_CODE: i32 = -1;

/// Outcome of a single execution.
///
/// The only value that outlives the call. A nonzero exit code on a process
/// that ran to completion is not an error here; `error` is set only for
/// invalid requests, start failures, cancellation, and wait-layer faults.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured stdout text (lossy UTF-8, capped by the capture limit)
    pub stdout: String,
    /// Captured stderr text (lossy UTF-8, capped by the capture limit)
    pub stderr: String,
    /// Exit code, or [`UNDETERMINED_EXIT_CODE`]
    pub exit_code: i32,
    /// Failure classification, `None` on any clean exit
    pub error: Option<ExecError>,
    /// Wall-clock execution time
    pub duration: Duration,
    /// Whether stdout capture dropped bytes
    pub stdout_truncated: bool,
    /// Whether stderr capture dropped bytes
    pub stderr_truncated: bool,
}

impl ExecResult {
    /// Whether the process ran to completion with a zero exit code.
    pub fn success(&self) -> bool {
        self.error.is_none() && self.exit_code == 0
    }

    /// Whether the execution was cut short by the cancellation token.
    pub fn cancelled(&self) -> bool {
        matches!(self.error, Some(ExecError::Cancelled(_)))
    }

    fn failed(error: ExecError) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: UNDETERMINED_EXIT_CODE,
            error: Some(error),
            duration: Duration::ZERO,
            stdout_truncated: false,
            stderr_truncated: false,
        }
    }
}

/// Execute a command to completion or cancellation.
///
/// Spawns `config`'s program, tees its output into per-stream capture
/// sinks and any configured external writers, and races process completion
/// against `cancel`. When the token fires first the process (its whole
/// group on Unix) is killed and the real exit is still reaped before
/// returning. All failures come back as data in the [`ExecResult`].
///
/// ```rust,no_run
/// use runbound_process::{execute, ExecConfig};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let cancel = CancellationToken::new();
/// let result = execute(&cancel, ExecConfig::new("echo").args(["hello"])).await;
/// assert!(result.success());
/// # }
/// ```
pub async fn execute(cancel: &CancellationToken, mut config: ExecConfig) -> ExecResult {
    if let Err(error) = config.validate() {
        return ExecResult::failed(error);
    }

    let mut cmd = Command::new(&config.program);
    cmd.args(&config.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Overrides append to the inherited environment; later entries for the
    // same key win.
    for (key, value) in &config.env {
        cmd.env(key, value);
    }
    if let Some(dir) = &config.working_dir {
        cmd.current_dir(dir);
    }
    controller::prepare(&mut cmd, &config);

    debug!(program = %config.program, args = ?config.args, "spawning process");

    let start = Instant::now();
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(error) => {
            warn!(program = %config.program, %error, "failed to spawn process");
            return ExecResult::failed(ExecError::Start(error));
        }
    };
    let pid = child.id();

    let limit = config.capture_limit;
    let stdout_task = tokio::spawn(pump(
        "stdout",
        child.stdout.take(),
        BoundedSink::new(limit),
        config.stdout_writer.take(),
    ));
    let stderr_task = tokio::spawn(pump(
        "stderr",
        child.stderr.take(),
        BoundedSink::new(limit),
        config.stderr_writer.take(),
    ));

    // Race completion against cancellation. `biased` makes a simultaneous
    // completion and cancellation resolve as cancellation: kill must still
    // be attempted before a racing exit is trusted.
    let completed = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        status = child.wait() => Some(status),
    };
    let cancelled = completed.is_none();
    let wait_result = match completed {
        Some(status) => status,
        None => {
            controller::kill(&mut child, pid);
            // Reap the real exit even though the outcome is already
            // decided; returning with an unwaited child would leak it.
            child.wait().await
        }
    };
    let duration = start.elapsed();

    // The pumps drain to EOF once the process (group) is gone; sink state
    // must not be read before they are joined.
    let stdout_sink = join_sink(stdout_task, limit).await;
    let stderr_sink = join_sink(stderr_task, limit).await;

    let (exit_code, error) = if cancelled {
        let outcome = match &wait_result {
            Ok(status) => status.to_string(),
            Err(error) => error.to_string(),
        };
        debug!(pid = ?pid, %outcome, "process killed after cancellation");
        (UNDETERMINED_EXIT_CODE, Some(ExecError::Cancelled(outcome)))
    } else {
        match wait_result {
            Ok(status) => (controller::exit_code(status), None),
            Err(error) => (UNDETERMINED_EXIT_CODE, Some(ExecError::Wait(error))),
        }
    };

    let stdout_truncated = stdout_sink.truncated();
    let stderr_truncated = stderr_sink.truncated();
    ExecResult {
        stdout: stdout_sink.into_string(),
        stderr: stderr_sink.into_string(),
        exit_code,
        error,
        duration,
        stdout_truncated,
        stderr_truncated,
    }
}

async fn join_sink(task: JoinHandle<BoundedSink>, limit: i64) -> BoundedSink {
    task.await.unwrap_or_else(|error| {
        warn!(%error, "output pump task failed");
        BoundedSink::new(limit)
    })
}
