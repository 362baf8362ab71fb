//! Orchestrator configuration
//!
//! Defines the configurable parameters of the orchestrator: bind address,
//! where the generator lives and how to launch it, default topic, and the
//! stop/run timeouts.

use std::path::PathBuf;
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API binds to (e.g., "0.0.0.0:8080")
    pub bind_addr: String,

    /// Directory the generator layouts are probed from
    pub base_dir: PathBuf,

    /// File name of the generator entry point inside `pipeline/core`
    pub script_name: String,

    /// Interpreter used to run the script; `None` executes the script directly
    pub interpreter: Option<String>,

    /// Arguments placed between the interpreter and the script path
    pub interpreter_args: Vec<String>,

    /// Topic recorded on content items when a run did not name one
    pub default_topic: String,

    /// How long a stop request waits for the process to confirm its exit
    pub stop_timeout: Duration,

    /// Upper bound on a single run; `None` lets runs go on indefinitely
    pub run_timeout: Option<Duration>,

    /// Directory published content is written to and listed from
    pub published_dir: PathBuf,
}

impl Config {
    /// Creates a new configuration with defaults rooted at `base_dir`
    pub fn new(base_dir: PathBuf) -> Self {
        let published_dir = base_dir.join("..").join("data").join("published");
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            base_dir,
            script_name: "Orchestrator.ps1".to_string(),
            interpreter: Some(default_interpreter().to_string()),
            interpreter_args: default_interpreter_args(),
            default_topic: "Default Topic".to_string(),
            stop_timeout: Duration::from_secs(5),
            run_timeout: None,
            published_dir,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Every variable is optional:
    /// - QUILL_BIND_ADDR (default: 0.0.0.0:8080)
    /// - QUILL_BASE_DIR (default: directory of the running executable)
    /// - QUILL_SCRIPT (default: Orchestrator.ps1)
    /// - QUILL_INTERPRETER (default: pwsh, powershell.exe on Windows; empty runs the script directly)
    /// - QUILL_DEFAULT_TOPIC (default: "Default Topic")
    /// - QUILL_STOP_TIMEOUT (seconds, default: 5)
    /// - QUILL_RUN_TIMEOUT (seconds, default: unset)
    /// - QUILL_PUBLISHED_DIR (default: <base>/../data/published)
    pub fn from_env() -> anyhow::Result<Self> {
        let base_dir = match std::env::var("QUILL_BASE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => executable_dir()?,
        };

        let mut config = Self::new(base_dir);

        if let Ok(addr) = std::env::var("QUILL_BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Ok(script) = std::env::var("QUILL_SCRIPT") {
            config.script_name = script;
        }

        if let Ok(interpreter) = std::env::var("QUILL_INTERPRETER") {
            if interpreter.trim().is_empty() {
                config.interpreter = None;
                config.interpreter_args.clear();
            } else {
                config.interpreter = Some(interpreter);
            }
        }

        if let Ok(topic) = std::env::var("QUILL_DEFAULT_TOPIC") {
            config.default_topic = topic;
        }

        if let Some(secs) = env_secs("QUILL_STOP_TIMEOUT") {
            config.stop_timeout = Duration::from_secs(secs);
        }

        config.run_timeout = env_secs("QUILL_RUN_TIMEOUT").map(Duration::from_secs);

        if let Ok(dir) = std::env::var("QUILL_PUBLISHED_DIR") {
            config.published_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.script_name.trim().is_empty() {
            anyhow::bail!("script_name cannot be empty");
        }

        if self.default_topic.trim().is_empty() {
            anyhow::bail!("default_topic cannot be empty");
        }

        if self.stop_timeout.is_zero() {
            anyhow::bail!("stop_timeout must be greater than 0");
        }

        if self.run_timeout.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("run_timeout must be greater than 0 when set");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

fn default_interpreter() -> &'static str {
    if cfg!(windows) {
        "powershell.exe"
    } else {
        "pwsh"
    }
}

fn default_interpreter_args() -> Vec<String> {
    ["-ExecutionPolicy", "Bypass", "-File"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn env_secs(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.parse::<u64>().ok())
}

fn executable_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Executable path {} has no parent", exe.display()))
}
