//! Generator executable resolution
//!
//! The generator ships in one of two layouts:
//! - bundled: `<base>/pipeline/core/<script>` next to the service
//! - development: `<base>/../pipeline/core/<script>` in a source checkout
//!
//! Candidates are probed in that order and the first existing script wins.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::RunnerError;
use crate::config::Config;

/// Which layout a resolved executable came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Bundled,
    Development,
}

/// A launchable generator: program, arguments, and the directory to run in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedExecutable {
    pub program: String,
    pub args: Vec<String>,
    pub script: PathBuf,
    pub working_dir: PathBuf,
    pub layout: Layout,
}

/// Locates the generator executable
pub trait ExecutableResolver: Send + Sync {
    /// Resolves the executable to launch
    ///
    /// # Errors
    /// `RunnerError::NotFound` when no candidate exists
    fn resolve(&self) -> Result<ResolvedExecutable, RunnerError>;
}

/// Resolver that probes the bundled and development layouts on disk
#[derive(Debug, Clone)]
pub struct ProbingResolver {
    base_dir: PathBuf,
    script_name: String,
    interpreter: Option<String>,
    interpreter_args: Vec<String>,
}

impl ProbingResolver {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        script_name: impl Into<String>,
        interpreter: Option<String>,
        interpreter_args: Vec<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            script_name: script_name.into(),
            interpreter,
            interpreter_args,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.base_dir.clone(),
            config.script_name.clone(),
            config.interpreter.clone(),
            config.interpreter_args.clone(),
        )
    }

    /// Candidate `pipeline/core` directories in probe order
    pub fn candidates(&self) -> [(Layout, PathBuf); 2] {
        [
            (Layout::Bundled, self.base_dir.join("pipeline").join("core")),
            (
                Layout::Development,
                self.base_dir.join("..").join("pipeline").join("core"),
            ),
        ]
    }

    /// The generator's `core` directory
    ///
    /// First candidate that exists, or the development layout when neither
    /// does. Used to locate files that live beside the script.
    pub fn core_dir(&self) -> PathBuf {
        let [bundled, development] = self.candidates();
        if bundled.1.is_dir() {
            bundled.1
        } else {
            development.1
        }
    }

    fn build(&self, layout: Layout, core_dir: &Path) -> ResolvedExecutable {
        let script = core_dir.join(&self.script_name);
        let script_arg = script.to_string_lossy().to_string();

        let (program, args) = match &self.interpreter {
            Some(interpreter) => {
                let mut args = self.interpreter_args.clone();
                args.push(script_arg);
                (interpreter.clone(), args)
            }
            None => (script_arg, Vec::new()),
        };

        ResolvedExecutable {
            program,
            args,
            script,
            working_dir: core_dir.to_path_buf(),
            layout,
        }
    }
}

impl ExecutableResolver for ProbingResolver {
    fn resolve(&self) -> Result<ResolvedExecutable, RunnerError> {
        let mut searched = Vec::new();

        for (layout, core_dir) in self.candidates() {
            let script = core_dir.join(&self.script_name);
            debug!("Probing {:?} generator at {}", layout, script.display());

            if script.is_file() {
                return Ok(self.build(layout, &core_dir));
            }
            searched.push(script);
        }

        Err(RunnerError::NotFound { searched })
    }
}

/// Resolver that always returns the same executable
#[derive(Debug, Clone)]
pub struct FixedResolver(pub ResolvedExecutable);

impl FixedResolver {
    /// Runs `program` with `args` in `working_dir`
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        let program = program.into();
        Self(ResolvedExecutable {
            script: PathBuf::from(&program),
            program,
            args,
            working_dir: working_dir.into(),
            layout: Layout::Bundled,
        })
    }
}

impl ExecutableResolver for FixedResolver {
    fn resolve(&self) -> Result<ResolvedExecutable, RunnerError> {
        Ok(self.0.clone())
    }
}
