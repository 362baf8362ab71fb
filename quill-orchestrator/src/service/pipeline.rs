//! Pipeline Service
//!
//! Single-flight supervision of the generator. At most one run is active at
//! a time; its output is buffered in the pipeline status, and a successful
//! exit turns the buffered output into a queued content item.

use chrono::Utc;
use quill_core::domain::pipeline::{PipelineStatus, RunResult};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::runner::{
    ExecutableResolver, LaunchSpec, ProcessHandle, ProcessRunner, RunEvent, RunnerError,
    TOPIC_ENV_VAR,
};
use crate::service::queue::QueueService;

/// Exit code recorded when the runner vanished without reporting one
const LOST_EXIT_CODE: i32 = -1;

/// Service error type
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Pipeline is already running")]
    AlreadyRunning,

    #[error("No pipeline process running")]
    NotRunning,

    #[error("Failed to start pipeline: {0}")]
    Launch(#[source] RunnerError),

    #[error("Failed to stop pipeline: {0}")]
    Terminate(#[source] RunnerError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// A run that was accepted and spawned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAccepted {
    pub run_id: Uuid,
    /// Effective topic: the requested one, or the default
    pub topic: String,
}

/// Result of a stop request
///
/// `confirmed` is false when the process had not reported its exit within
/// the stop timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopOutcome {
    pub confirmed: bool,
    pub exit_code: Option<i32>,
}

/// Tunables for runs
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub default_topic: String,
    pub stop_timeout: Duration,
    pub run_timeout: Option<Duration>,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_topic: config.default_topic.clone(),
            stop_timeout: config.stop_timeout,
            run_timeout: config.run_timeout,
        }
    }
}

struct ActiveRun {
    run_id: Uuid,
    handle: Box<dyn ProcessHandle>,
    exit: watch::Receiver<Option<i32>>,
}

#[derive(Default)]
struct PipelineState {
    status: PipelineStatus,
    active: Option<ActiveRun>,
}

/// Pipeline orchestrator
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    state: Arc<Mutex<PipelineState>>,
    queue: Arc<QueueService>,
    runner: Arc<dyn ProcessRunner>,
    resolver: Arc<dyn ExecutableResolver>,
    settings: RunSettings,
}

impl PipelineOrchestrator {
    pub fn new(
        queue: Arc<QueueService>,
        runner: Arc<dyn ProcessRunner>,
        resolver: Arc<dyn ExecutableResolver>,
        settings: RunSettings,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(PipelineState::default())),
            queue,
            runner,
            resolver,
            settings,
        }
    }

    /// Start a run unless one is already active
    ///
    /// A blank topic counts as no topic. The generator receives the trimmed
    /// topic through its environment (empty when none was given); the content
    /// item records the effective one.
    pub async fn request_run(&self, topic: Option<String>) -> Result<RunAccepted> {
        let topic = topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let effective_topic = topic
            .clone()
            .unwrap_or_else(|| self.settings.default_topic.clone());

        // Probes the filesystem, so it stays outside the state lock
        let resolved = self.resolver.resolve();

        let mut state = self.state.lock().await;

        if state.status.running {
            return Err(PipelineError::AlreadyRunning);
        }

        state.status.running = true;
        state.status.output.clear();
        state.status.errors.clear();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let launched = resolved.and_then(|executable| {
            info!(
                "Starting pipeline ({:?} layout): {} {:?}",
                executable.layout, executable.program, executable.args
            );
            let spec = LaunchSpec {
                program: executable.program,
                args: executable.args,
                working_dir: executable.working_dir,
                env: vec![(TOPIC_ENV_VAR.to_string(), topic.unwrap_or_default())],
            };
            self.runner.start(spec, events_tx)
        });

        let handle = match launched {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to start pipeline: {}", e);
                state.status.running = false;
                state.status.errors.push(e.to_string());
                return Err(PipelineError::Launch(e));
            }
        };

        let run_id = Uuid::new_v4();
        let pid = handle.pid();
        let (exit_tx, exit_rx) = watch::channel(None);

        state.status.run_id = Some(run_id);
        state.status.topic = Some(effective_topic.clone());
        state.active = Some(ActiveRun {
            run_id,
            handle,
            exit: exit_rx,
        });
        drop(state);

        let run = RunContext {
            run_id,
            topic: effective_topic.clone(),
        };
        tokio::spawn(self.clone().supervise_run(run, events_rx, exit_tx));

        info!(
            "Pipeline run {} started (pid {:?}, topic: {})",
            run_id, pid, effective_topic
        );
        Ok(RunAccepted {
            run_id,
            topic: effective_topic,
        })
    }

    /// Stop the active run
    ///
    /// The run is marked stopped right away; the call then waits up to the
    /// stop timeout for the process to confirm its exit. A process that still
    /// exits with code 0 is recorded as a success.
    pub async fn request_stop(&self) -> Result<StopOutcome> {
        let mut exit = {
            let mut state = self.state.lock().await;
            let active = state.active.take().ok_or(PipelineError::NotRunning)?;

            match active.handle.terminate() {
                // Already exiting on its own; the exit is still awaited below
                Ok(()) | Err(RunnerError::NotRunning) => {}
                Err(e) => {
                    error!("Failed to stop pipeline run {}: {}", active.run_id, e);
                    state.active = Some(active);
                    return Err(PipelineError::Terminate(e));
                }
            }

            state.status.running = false;
            state.status.last_result = Some(RunResult::Stopped);
            info!("Pipeline run {} stopped", active.run_id);

            active.exit
        };

        let exit_code = match tokio::time::timeout(
            self.settings.stop_timeout,
            exit.wait_for(Option::is_some),
        )
        .await
        {
            Ok(Ok(code)) => *code,
            Ok(Err(_)) => None,
            Err(_) => {
                warn!(
                    "Pipeline process did not exit within {:?} of stop request",
                    self.settings.stop_timeout
                );
                None
            }
        };

        Ok(StopOutcome {
            confirmed: exit_code.is_some(),
            exit_code,
        })
    }

    /// Snapshot of the pipeline status
    pub async fn status(&self) -> PipelineStatus {
        self.state.lock().await.status.clone()
    }

    /// Number of items in the content queue
    pub async fn queue_length(&self) -> usize {
        match self.queue.count().await {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to count content queue: {}", e);
                0
            }
        }
    }

    /// Consumes the events of one run until it exits
    async fn supervise_run(
        self,
        run: RunContext,
        mut events: mpsc::UnboundedReceiver<RunEvent>,
        exit_tx: watch::Sender<Option<i32>>,
    ) {
        let run_id = run.run_id;
        let mut deadline = self
            .settings
            .run_timeout
            .map(|timeout| tokio::time::Instant::now() + timeout);
        let mut timed_out = false;
        let mut output = Vec::new();

        let code = loop {
            let event = match deadline {
                Some(at) => {
                    tokio::select! {
                        event = events.recv() => event,
                        _ = tokio::time::sleep_until(at) => {
                            deadline = None;
                            timed_out = self.terminate_overdue(run_id).await;
                            continue;
                        }
                    }
                }
                None => events.recv().await,
            };

            match event {
                Some(RunEvent::Stdout(line)) => {
                    info!("[Pipeline] {}", line);
                    output.push(line.clone());
                    self.append_line(run_id, line, false).await;
                }
                Some(RunEvent::Stderr(line)) => {
                    warn!("[Pipeline Error] {}", line);
                    self.append_line(run_id, line, true).await;
                }
                Some(RunEvent::Exited(code)) => break code,
                None => {
                    warn!("Runner for {} closed without an exit code", run_id);
                    break LOST_EXIT_CODE;
                }
            }
        };

        let result = if timed_out {
            RunResult::Failed
        } else {
            RunResult::from_exit_code(code)
        };
        self.finish_run(run, output, result, code).await;
        let _ = exit_tx.send(Some(code));
    }

    /// Buffers a line unless a newer run has taken over the status
    async fn append_line(&self, run_id: Uuid, line: String, is_error: bool) {
        let mut state = self.state.lock().await;
        if state.status.run_id != Some(run_id) {
            return;
        }
        if is_error {
            state.status.errors.push(line);
        } else {
            state.status.output.push(line);
        }
    }

    /// Terminates a run that outlived the run timeout
    ///
    /// Returns false when the run is no longer the active one.
    async fn terminate_overdue(&self, run_id: Uuid) -> bool {
        let state = self.state.lock().await;
        let Some(active) = state.active.as_ref().filter(|a| a.run_id == run_id) else {
            return false;
        };

        warn!(
            "Pipeline run {} exceeded {:?}, terminating",
            run_id, self.settings.run_timeout
        );
        if let Err(e) = active.handle.terminate() {
            warn!("Failed to terminate overdue run {}: {}", run_id, e);
        }
        true
    }

    /// Records the outcome of a run
    ///
    /// Every successful exit is queued, including one that raced a stop
    /// request. The status only changes while the run still owns it: a
    /// stopped run keeps `stopped` unless it exited cleanly before a newer
    /// run started.
    async fn finish_run(
        &self,
        run: RunContext,
        output: Vec<String>,
        result: RunResult,
        code: i32,
    ) {
        let run_id = run.run_id;
        let mut state = self.state.lock().await;

        let was_active = state.active.as_ref().is_some_and(|a| a.run_id == run_id);
        if was_active {
            state.active = None;
        }

        if result == RunResult::Success {
            // Item must be visible before `running` drops
            if let Err(e) = self.queue.enqueue(run.topic, output.join("\n")).await {
                error!("Failed to queue output of run {}: {}", run_id, e);
            }
        }

        let owns_status = state.status.run_id == Some(run_id);
        if !was_active && !(owns_status && result == RunResult::Success) {
            debug!("Ignoring exit {} of stopped run {}", code, run_id);
            return;
        }

        state.status.running = false;
        state.status.last_run_at = Some(Utc::now());
        state.status.last_result = Some(result);

        info!("Pipeline run {} finished: {} (exit code {})", run_id, result, code);
    }
}

/// Identity of a run as seen by its supervisor
struct RunContext {
    run_id: Uuid,
    topic: String,
}
