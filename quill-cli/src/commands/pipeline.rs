//! Run control command handlers
//!
//! Status, generate, stop, and following a run's live output.

use anyhow::Result;
use colored::*;
use quill_client::OrchestratorClient;
use quill_core::domain::pipeline::{PipelineStatus, RunResult};
use std::time::Duration;
use uuid::Uuid;

/// How often `watch` polls the orchestrator
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Show pipeline status
pub async fn show_status(client: &OrchestratorClient) -> Result<()> {
    let response = client.status().await?;
    let status = &response.status;

    println!("{}", "Pipeline Status:".bold());
    let state = if status.running {
        "running".green().bold()
    } else {
        "idle".dimmed()
    };
    println!("  State:       {}", state);
    if let Some(topic) = &status.topic {
        println!("  Topic:       {}", topic.cyan());
    }
    if let Some(run_id) = status.run_id {
        println!("  Run ID:      {}", run_id.to_string().dimmed());
    }
    if let Some(last_run_at) = status.last_run_at {
        println!("  Last run:    {}", last_run_at.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(result) = status.last_result {
        println!("  Last result: {}", colorize_result(result));
    }
    println!("  Queue:       {} item(s)", response.queue_length);

    if !status.output.is_empty() {
        println!("\n{}", "Output:".bold());
        println!("{}", "─".repeat(80).dimmed());
        for line in &status.output {
            println!("{}", line);
        }
    }
    if !status.errors.is_empty() {
        println!("\n{}", "Errors:".bold().red());
        println!("{}", "─".repeat(80).dimmed());
        for line in &status.errors {
            println!("{}", line.red());
        }
    }

    Ok(())
}

/// Start a generation run
pub async fn generate(
    client: &OrchestratorClient,
    topic: Option<&str>,
    follow: bool,
) -> Result<()> {
    let accepted = match client.generate(topic).await {
        Ok(accepted) => accepted,
        Err(e) if e.is_conflict() => {
            println!(
                "{}",
                "✗ A pipeline run is already in progress.".yellow().bold()
            );
            println!("  Use {} to follow it.", "quill watch".cyan());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", "✓ Pipeline started!".green().bold());
    println!("  Run ID: {}", accepted.run_id.to_string().cyan());
    println!("  Topic:  {}", accepted.topic.bold());

    if follow {
        println!();
        watch(client).await?;
    }

    Ok(())
}

/// Stop the active run
pub async fn stop(client: &OrchestratorClient) -> Result<()> {
    let outcome = client.stop().await?;

    if outcome.termination_confirmed {
        println!("{}", format!("✓ {}", outcome.message).green().bold());
        if let Some(code) = outcome.exit_code {
            println!("  Exit code: {}", code.to_string().dimmed());
        }
    } else {
        println!("{}", format!("! {}", outcome.message).yellow().bold());
        println!("  The process may still be shutting down.");
    }

    Ok(())
}

/// Follow the current run until it finishes
pub async fn watch(client: &OrchestratorClient) -> Result<()> {
    let mut follower = OutputFollower::default();

    loop {
        let status = client.status().await?.status;

        if !follower.track(&status) {
            println!("{}", "A newer run has started; stopped following.".yellow());
            return Ok(());
        }
        follower.print_new(&status);

        if !status.running {
            match status.last_result {
                Some(result) => println!("\nRun finished: {}", colorize_result(result)),
                None => println!("{}", "No pipeline run in progress.".yellow()),
            }
            return Ok(());
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Remembers how much of a run's output was already printed
#[derive(Default)]
struct OutputFollower {
    run_id: Option<Uuid>,
    stdout_seen: usize,
    stderr_seen: usize,
}

impl OutputFollower {
    /// Latches onto the first run seen; false once a different run shows up
    fn track(&mut self, status: &PipelineStatus) -> bool {
        let Some(seen) = self.run_id else {
            self.run_id = status.run_id;
            return true;
        };
        status.run_id.is_none_or(|current| current == seen)
    }

    fn print_new(&mut self, status: &PipelineStatus) {
        for line in status.output.iter().skip(self.stdout_seen) {
            println!("{}", line);
        }
        for line in status.errors.iter().skip(self.stderr_seen) {
            println!("{}", line.red());
        }
        self.stdout_seen = self.stdout_seen.max(status.output.len());
        self.stderr_seen = self.stderr_seen.max(status.errors.len());
    }
}

fn colorize_result(result: RunResult) -> ColoredString {
    match result {
        RunResult::Success => result.to_string().green(),
        RunResult::Failed => result.to_string().red(),
        RunResult::Stopped => result.to_string().yellow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(run_id: &str, output: &[&str], running: bool) -> PipelineStatus {
        serde_json::from_value(serde_json::json!({
            "running": running,
            "lastRunAt": null,
            "lastResult": null,
            "runId": run_id,
            "topic": "t",
            "output": output,
            "errors": [],
        }))
        .unwrap()
    }

    const RUN_A: &str = "5b1f3c9e-7a52-4c1e-9a53-0d8f2f3c1a10";
    const RUN_B: &str = "0e4d2a71-93b8-4f5e-8c2b-6a7d1e9f4b22";

    #[test]
    fn test_follower_only_advances() {
        let mut follower = OutputFollower::default();

        assert!(follower.track(&status(RUN_A, &["a"], true)));
        follower.print_new(&status(RUN_A, &["a"], true));
        assert_eq!(follower.stdout_seen, 1);

        follower.print_new(&status(RUN_A, &["a", "b", "c"], true));
        assert_eq!(follower.stdout_seen, 3);
    }

    #[test]
    fn test_follower_detects_newer_run() {
        let mut follower = OutputFollower::default();

        assert!(follower.track(&status(RUN_A, &[], true)));
        assert_eq!(follower.run_id, Some(Uuid::parse_str(RUN_A).unwrap()));
        assert!(follower.track(&status(RUN_A, &[], false)));
        assert!(!follower.track(&status(RUN_B, &[], true)));
    }
}
