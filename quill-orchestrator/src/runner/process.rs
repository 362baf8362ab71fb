//! Generator process supervision
//!
//! Spawns the generator as a child process, forwards its stdout/stderr line
//! by line as [`RunEvent`]s, and reports the exit code once both streams are
//! drained. Termination requests are delivered to the supervising task,
//! which sends SIGTERM (or kills the process on platforms without signals).

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::RunnerError;

/// How long to keep reading output after the process exited
///
/// Grandchildren can inherit the pipes and keep them open past the
/// generator's own exit.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Exit code reported when the process died from a signal
const SIGNALLED_EXIT_CODE: i32 = -1;

/// Everything needed to launch one generator run
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: Vec<(String, String)>,
}

/// Something observed on a running process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Stdout(String),
    Stderr(String),
    /// Always the last event of a run
    Exited(i32),
}

/// Handle to a started process
pub trait ProcessHandle: Send + Sync {
    /// OS process id, when known
    fn pid(&self) -> Option<u32>;

    /// Requests graceful termination
    ///
    /// Returns immediately; the exit is reported later as `RunEvent::Exited`.
    ///
    /// # Errors
    /// `RunnerError::NotRunning` when the process already exited or was
    /// already asked to terminate
    fn terminate(&self) -> Result<(), RunnerError>;
}

/// Starts generator processes
pub trait ProcessRunner: Send + Sync {
    /// Spawns the process described by `spec`
    ///
    /// Output lines and the final exit code are sent on `events`, in order
    /// within each stream. Must be called from within a tokio runtime.
    fn start(
        &self,
        spec: LaunchSpec,
        events: mpsc::UnboundedSender<RunEvent>,
    ) -> Result<Box<dyn ProcessHandle>, RunnerError>;
}

/// Runner backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for CommandRunner {
    fn start(
        &self,
        spec: LaunchSpec,
        events: mpsc::UnboundedSender<RunEvent>,
    ) -> Result<Box<dyn ProcessHandle>, RunnerError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.working_dir)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| RunnerError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let pid = child.id();
        info!(
            "Spawned {} (pid {:?}) in {}",
            spec.program,
            pid,
            spec.working_dir.display()
        );

        let (terminate_tx, terminate_rx) = oneshot::channel();
        tokio::spawn(supervise(child, terminate_rx, events));

        Ok(Box::new(CommandHandle {
            pid,
            terminate_tx: Mutex::new(Some(terminate_tx)),
        }))
    }
}

struct CommandHandle {
    pid: Option<u32>,
    terminate_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl ProcessHandle for CommandHandle {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn terminate(&self) -> Result<(), RunnerError> {
        let sender = self
            .terminate_tx
            .lock()
            .map_err(|e| RunnerError::Signal(format!("Failed to lock process handle: {}", e)))?
            .take()
            .ok_or(RunnerError::NotRunning)?;

        // The supervisor drops the receiver once the process exited
        sender.send(()).map_err(|_| RunnerError::NotRunning)
    }
}

/// Waits for the child, forwarding output and honouring a terminate request
async fn supervise(
    mut child: Child,
    mut terminate_rx: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<RunEvent>,
) {
    let stdout_task = child
        .stdout
        .take()
        .map(|out| tokio::spawn(forward_lines(out, events.clone(), RunEvent::Stdout)));
    let stderr_task = child
        .stderr
        .take()
        .map(|err| tokio::spawn(forward_lines(err, events.clone(), RunEvent::Stderr)));

    let exited = tokio::select! {
        status = child.wait() => Some(status),
        Ok(()) = &mut terminate_rx => None,
    };
    drop(terminate_rx);

    let status = match exited {
        Some(status) => status,
        None => {
            send_terminate(&mut child);
            child.wait().await
        }
    };

    let code = match status {
        Ok(status) => status.code().unwrap_or(SIGNALLED_EXIT_CODE),
        Err(e) => {
            error!("Failed to wait for generator process: {}", e);
            SIGNALLED_EXIT_CODE
        }
    };

    for task in [stdout_task, stderr_task].into_iter().flatten() {
        let abort = task.abort_handle();
        if tokio::time::timeout(DRAIN_TIMEOUT, task).await.is_err() {
            warn!("Output stream still open {:?} after exit, dropping it", DRAIN_TIMEOUT);
            abort.abort();
        }
    }

    debug!("Generator process exited with code {}", code);
    let _ = events.send(RunEvent::Exited(code));
}

#[cfg(unix)]
fn send_terminate(child: &mut Child) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return;
    };

    if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        && e != nix::errno::Errno::ESRCH
    {
        warn!("Failed to send SIGTERM to {}: {}", pid, e);
    }
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        warn!("Failed to kill generator process: {}", e);
    }
}

/// Forwards each line of `reader` as an event until EOF
///
/// Bytes are decoded lossily so a stray non-UTF-8 byte does not end the stream.
async fn forward_lines<R>(
    reader: R,
    events: mpsc::UnboundedSender<RunEvent>,
    wrap: fn(String) -> RunEvent,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if events.send(wrap(line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Failed to read generator output: {}", e);
                break;
            }
        }
    }
}
