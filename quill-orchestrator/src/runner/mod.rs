//! Runner layer
//!
//! Everything that touches the external generator process: locating the
//! executable and spawning/supervising a single invocation of it.
//!
//! Both concerns sit behind traits so the orchestrator can be driven by a
//! scripted runner in tests.

mod process;
mod resolver;

use thiserror::Error;

// Re-export traits
pub use process::{ProcessHandle, ProcessRunner};
pub use resolver::ExecutableResolver;

// Re-export implementations
pub use process::{CommandRunner, LaunchSpec, RunEvent};
pub use resolver::{FixedResolver, Layout, ProbingResolver, ResolvedExecutable};

/// Environment variable carrying the run topic into the generator
pub const TOPIC_ENV_VAR: &str = "PIPELINE_TOPIC";

/// Errors raised while launching or signalling the generator
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Generator executable not found (searched: {})", format_paths(.searched))]
    NotFound { searched: Vec<std::path::PathBuf> },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process is not running")]
    NotRunning,

    #[error("Failed to signal process: {0}")]
    Signal(String),
}

fn format_paths(paths: &[std::path::PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
