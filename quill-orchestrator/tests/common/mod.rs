#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use quill_core::domain::pipeline::PipelineStatus;
use quill_orchestrator::api::{self, AppState};
use quill_orchestrator::repository::InMemoryContentRepository;
use quill_orchestrator::runner::{
    FixedResolver, LaunchSpec, ProcessHandle, ProcessRunner, RunEvent, RunnerError,
};
use quill_orchestrator::service::{
    FilePublisher, GeneratorConfigService, OutputService, PipelineOrchestrator, QueueService,
    RunSettings,
};

pub const DEFAULT_TOPIC: &str = "Default Topic";

// ---------------------------------------------------------------------------
// Scripted process runner
// ---------------------------------------------------------------------------

/// Process runner driven by the test instead of a real process
///
/// Every `start` records its launch spec and keeps the event sender so the
/// test can emit output and exit codes for the most recent run.
#[derive(Default)]
pub struct ScriptedRunner {
    launches: Mutex<Vec<LaunchSpec>>,
    senders: Mutex<Vec<mpsc::UnboundedSender<RunEvent>>>,
    /// Exit code reported as soon as a run is terminated
    exit_on_terminate: Option<i32>,
    fail_spawn: AtomicBool,
}

impl ScriptedRunner {
    /// Runs that never report an exit on their own after terminate
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs that report `code` as soon as they are terminated
    pub fn exiting_on_terminate(code: i32) -> Self {
        Self {
            exit_on_terminate: Some(code),
            ..Self::default()
        }
    }

    pub fn fail_next_spawn(&self) {
        self.fail_spawn.store(true, Ordering::SeqCst);
    }

    pub fn launches(&self) -> Vec<LaunchSpec> {
        self.launches.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    pub fn stdout(&self, line: &str) {
        self.emit(RunEvent::Stdout(line.to_string()));
    }

    pub fn stderr(&self, line: &str) {
        self.emit(RunEvent::Stderr(line.to_string()));
    }

    pub fn exit(&self, code: i32) {
        self.emit(RunEvent::Exited(code));
    }

    /// Stdout line from an earlier run, by launch order
    pub fn stdout_on(&self, run: usize, line: &str) {
        self.emit_on(run, RunEvent::Stdout(line.to_string()));
    }

    pub fn exit_on(&self, run: usize, code: i32) {
        self.emit_on(run, RunEvent::Exited(code));
    }

    fn emit(&self, event: RunEvent) {
        let last = self.launch_count().checked_sub(1).expect("no run was started");
        self.emit_on(last, event);
    }

    fn emit_on(&self, run: usize, event: RunEvent) {
        let senders = self.senders.lock().unwrap();
        senders[run].send(event).expect("run supervisor is gone");
    }
}

impl ProcessRunner for ScriptedRunner {
    fn start(
        &self,
        spec: LaunchSpec,
        events: mpsc::UnboundedSender<RunEvent>,
    ) -> Result<Box<dyn ProcessHandle>, RunnerError> {
        if self.fail_spawn.swap(false, Ordering::SeqCst) {
            return Err(RunnerError::Spawn {
                program: spec.program,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }

        self.launches.lock().unwrap().push(spec);
        self.senders.lock().unwrap().push(events.clone());

        Ok(Box::new(ScriptedHandle {
            events,
            exit_on_terminate: self.exit_on_terminate,
            terminated: AtomicBool::new(false),
        }))
    }
}

struct ScriptedHandle {
    events: mpsc::UnboundedSender<RunEvent>,
    exit_on_terminate: Option<i32>,
    terminated: AtomicBool,
}

impl ProcessHandle for ScriptedHandle {
    fn pid(&self) -> Option<u32> {
        Some(4242)
    }

    fn terminate(&self) -> Result<(), RunnerError> {
        if self.terminated.swap(true, Ordering::SeqCst) {
            return Err(RunnerError::NotRunning);
        }
        if let Some(code) = self.exit_on_terminate {
            let _ = self.events.send(RunEvent::Exited(code));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test application
// ---------------------------------------------------------------------------

/// Services wired to a scripted runner and a scratch directory
pub struct TestApp {
    pub state: AppState,
    pub runner: Arc<ScriptedRunner>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn new(runner: ScriptedRunner) -> Self {
        Self::with_settings(runner, test_settings())
    }

    pub fn with_settings(runner: ScriptedRunner, settings: RunSettings) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(runner);
        let published = dir.path().join("published");
        let core_dir = dir.path().join("core");
        std::fs::create_dir_all(&core_dir).unwrap();

        let queue = Arc::new(QueueService::new(
            Arc::new(InMemoryContentRepository::new()),
            Arc::new(FilePublisher::new(&published)),
        ));
        let pipeline = PipelineOrchestrator::new(
            queue.clone(),
            runner.clone(),
            Arc::new(FixedResolver::new("generator", vec![], &core_dir)),
            settings,
        );

        let state = AppState {
            pipeline,
            queue,
            generator_config: Arc::new(GeneratorConfigService::in_core_dir(&core_dir)),
            output: Arc::new(OutputService::new(&published)),
        };

        Self { state, runner, dir }
    }

    pub fn router(&self) -> Router {
        api::create_router(self.state.clone())
    }

    pub fn pipeline(&self) -> &PipelineOrchestrator {
        &self.state.pipeline
    }

    pub fn queue(&self) -> &QueueService {
        &self.state.queue
    }

    /// Waits until the pipeline status satisfies `predicate`
    pub async fn wait_for_status<F>(&self, predicate: F) -> PipelineStatus
    where
        F: Fn(&PipelineStatus) -> bool,
    {
        wait_for_status(self.pipeline(), predicate).await
    }

    /// Runs one scripted generation to completion
    pub async fn complete_run(&self, topic: Option<&str>, lines: &[&str], code: i32) {
        self.pipeline()
            .request_run(topic.map(str::to_string))
            .await
            .unwrap();
        for line in lines {
            self.runner.stdout(line);
        }
        self.runner.exit(code);
        self.wait_for_status(|s| !s.running).await;
    }
}

pub fn test_settings() -> RunSettings {
    RunSettings {
        default_topic: DEFAULT_TOPIC.to_string(),
        stop_timeout: Duration::from_millis(200),
        run_timeout: None,
    }
}

pub async fn wait_for_status<F>(pipeline: &PipelineOrchestrator, predicate: F) -> PipelineStatus
where
    F: Fn(&PipelineStatus) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let status = pipeline.status().await;
        if predicate(&status) {
            return status;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for pipeline status, last seen: {status:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, Body::empty()).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Body::empty()).await
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
