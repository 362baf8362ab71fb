//! Integration tests for the run control and generator endpoints.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{ScriptedRunner, TestApp, body_json, expect_json, get, post_empty, send_json};
use serde_json::json;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::new(ScriptedRunner::new());
    let response = get(app.router(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = TestApp::new(ScriptedRunner::new());
    let response = get(app.router(), "/pipeline/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Generate / status / stop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn idle_status_has_empty_buffers() {
    let app = TestApp::new(ScriptedRunner::new());

    let json = expect_json(get(app.router(), "/pipeline/status").await, StatusCode::OK).await;

    assert_eq!(json["running"], false);
    assert!(json["lastRunAt"].is_null());
    assert!(json["lastResult"].is_null());
    assert_eq!(json["output"], json!([]));
    assert_eq!(json["errors"], json!([]));
    assert_eq!(json["queueLength"], 0);
}

#[tokio::test]
async fn generate_returns_202_then_409_while_running() {
    let app = TestApp::new(ScriptedRunner::new());

    let first = send_json(
        app.router(),
        Method::POST,
        "/pipeline/generate",
        json!({ "topic": "Rust" }),
    )
    .await;
    let json = expect_json(first, StatusCode::ACCEPTED).await;
    assert_eq!(json["topic"], "Rust");
    assert!(json["runId"].is_string());

    let second = send_json(
        app.router(),
        Method::POST,
        "/pipeline/generate",
        json!({ "topic": "Go" }),
    )
    .await;
    let json = expect_json(second, StatusCode::CONFLICT).await;
    assert!(json["error"].as_str().unwrap().contains("already running"));

    assert_eq!(app.runner.launch_count(), 1);
}

#[tokio::test]
async fn generate_without_body_uses_default_topic() {
    let app = TestApp::new(ScriptedRunner::new());

    let response = post_empty(app.router(), "/pipeline/generate").await;
    let json = expect_json(response, StatusCode::ACCEPTED).await;

    assert_eq!(json["topic"], common::DEFAULT_TOPIC);
}

#[tokio::test]
async fn generate_with_malformed_body_is_bad_request() {
    let app = TestApp::new(ScriptedRunner::new());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/pipeline/generate")
        .header("content-type", "application/json")
        .body(Body::from("{ topic"))
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.runner.launch_count(), 0);
}

#[tokio::test]
async fn generate_launch_failure_is_500() {
    let app = TestApp::new(ScriptedRunner::new());
    app.runner.fail_next_spawn();

    let response = post_empty(app.router(), "/pipeline/generate").await;
    let json = expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert!(json["error"].as_str().unwrap().contains("Failed to start"));

    let status = body_json(get(app.router(), "/pipeline/status").await).await;
    assert_eq!(status["running"], false);
}

#[tokio::test]
async fn status_reports_live_output() {
    let app = TestApp::new(ScriptedRunner::new());
    post_empty(app.router(), "/pipeline/generate").await;

    app.runner.stdout("step 1");
    app.runner.stderr("warning: slow model");
    app.wait_for_status(|s| !s.output.is_empty() && !s.errors.is_empty())
        .await;

    let json = expect_json(get(app.router(), "/pipeline/status").await, StatusCode::OK).await;
    assert_eq!(json["running"], true);
    assert_eq!(json["output"], json!(["step 1"]));
    assert_eq!(json["errors"], json!(["warning: slow model"]));
}

#[tokio::test]
async fn stop_when_idle_is_bad_request() {
    let app = TestApp::new(ScriptedRunner::new());

    let response = post_empty(app.router(), "/pipeline/stop").await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;

    assert_eq!(json["error"], "No pipeline process running");
}

#[tokio::test]
async fn stop_reports_confirmation() {
    let app = TestApp::new(ScriptedRunner::exiting_on_terminate(-1));
    post_empty(app.router(), "/pipeline/generate").await;

    let response = post_empty(app.router(), "/pipeline/stop").await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["terminationConfirmed"], true);
    assert_eq!(json["exitCode"], -1);

    let status = body_json(get(app.router(), "/pipeline/status").await).await;
    assert_eq!(status["running"], false);
    assert_eq!(status["lastResult"], "stopped");
}

#[tokio::test]
async fn stop_reports_unconfirmed_termination() {
    let app = TestApp::new(ScriptedRunner::new());
    post_empty(app.router(), "/pipeline/generate").await;

    let response = post_empty(app.router(), "/pipeline/stop").await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["terminationConfirmed"], false);
    assert!(json["exitCode"].is_null());
    assert_eq!(json["message"], "Stop requested, termination unconfirmed");
}

// ---------------------------------------------------------------------------
// Generator config and output
// ---------------------------------------------------------------------------

#[tokio::test]
async fn config_round_trips_through_the_file() {
    let app = TestApp::new(ScriptedRunner::new());
    let path = app.state.generator_config.path().to_path_buf();
    std::fs::write(
        &path,
        json!({
            "LMStudio": { "ApiUrl": "http://localhost:1234/v1", "Model": "small" },
            "WordPress": { "Enabled": false, "Username": "u", "AppPassword": "p" }
        })
        .to_string(),
    )
    .unwrap();

    let json = expect_json(get(app.router(), "/pipeline/config").await, StatusCode::OK).await;
    assert_eq!(json["LMStudio"]["Model"], "small");
    assert_eq!(json["WordPress"]["credentialsSet"], true);
    assert!(json["WordPress"].get("AppPassword").is_none());

    let response = send_json(
        app.router(),
        Method::POST,
        "/pipeline/config",
        json!({ "LMStudio": { "Model": "large" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app.router(), "/pipeline/config").await).await;
    assert_eq!(json["LMStudio"]["Model"], "large");
    assert_eq!(json["LMStudio"]["ApiUrl"], "http://localhost:1234/v1");
}

#[tokio::test]
async fn missing_config_file_is_500() {
    let app = TestApp::new(ScriptedRunner::new());

    let response = get(app.router(), "/pipeline/config").await;
    let json = expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;

    assert!(json["error"].as_str().unwrap().contains("Config.json"));
}

#[tokio::test]
async fn malformed_config_patch_is_rejected() {
    let app = TestApp::new(ScriptedRunner::new());

    let response = send_json(
        app.router(),
        Method::POST,
        "/pipeline/config",
        json!({ "LMStudio": "not an object" }),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;

    assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn output_lists_published_files() {
    let app = TestApp::new(ScriptedRunner::new());

    let json = expect_json(get(app.router(), "/pipeline/output").await, StatusCode::OK).await;
    assert_eq!(json["files"], json!([]));
    assert!(json["outputPath"].as_str().unwrap().ends_with("published"));

    std::fs::write(app.dir.path().join("published/1-post.md"), "# Post\n").unwrap();

    let json = body_json(get(app.router(), "/pipeline/output").await).await;
    assert_eq!(json["files"][0]["name"], "1-post.md");
    assert_eq!(json["files"][0]["size"], 7);
}
