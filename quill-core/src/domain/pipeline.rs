//! Pipeline run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Live state of the generation pipeline
///
/// One instance per orchestrator. `output` and `errors` hold the lines of the
/// current run, or of the most recent one when idle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStatus {
    pub running: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_result: Option<RunResult>,
    pub run_id: Option<Uuid>,
    pub topic: Option<String>,
    pub output: Vec<String>,
    pub errors: Vec<String>,
}

/// Outcome of the last finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    Success,
    Failed,
    Stopped,
}

impl RunResult {
    /// Maps a process exit code to a run result
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            RunResult::Success
        } else {
            RunResult::Failed
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunResult::Success => "success",
            RunResult::Failed => "failed",
            RunResult::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
