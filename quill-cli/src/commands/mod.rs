//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod generator;
mod pipeline;
mod queue;

pub use generator::ConfigCommands;
pub use queue::QueueCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show pipeline status and buffered output
    Status,
    /// Start a generation run
    Generate {
        /// Topic for the generator (defaults to the orchestrator's default topic)
        #[arg(short, long)]
        topic: Option<String>,

        /// Stream output until the run finishes
        #[arg(short, long)]
        follow: bool,
    },
    /// Stop the active run
    Stop,
    /// Stream the active run's output until it finishes
    Watch,
    /// Review queue management
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
    /// Generator configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// List published output files
    Output,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        Commands::Status => pipeline::show_status(&client).await,
        Commands::Generate { topic, follow } => {
            pipeline::generate(&client, topic.as_deref(), follow).await
        }
        Commands::Stop => pipeline::stop(&client).await,
        Commands::Watch => pipeline::watch(&client).await,
        Commands::Queue { command } => queue::handle_queue_command(command, &client).await,
        Commands::Config { command } => generator::handle_config_command(command, &client).await,
        Commands::Output => generator::list_output(&client).await,
    }
}
