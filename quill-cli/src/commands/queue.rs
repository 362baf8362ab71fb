//! Queue command handlers
//!
//! Review workflow: listing, inspecting, approving, rejecting, editing,
//! removing and publishing generated content.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use quill_client::OrchestratorClient;
use quill_core::domain::content::{ContentItem, ContentStatus};
use quill_core::dto::content::UpdateContent;

/// Queue subcommands
#[derive(Subcommand)]
pub enum QueueCommands {
    /// List all queued content
    List,
    /// Show a content item in full
    Show {
        /// Content ID
        id: u64,
    },
    /// Approve a content item for publishing
    Approve {
        /// Content ID
        id: u64,
    },
    /// Reject a content item
    Reject {
        /// Content ID
        id: u64,
    },
    /// Replace a content item's body with an edited revision
    Edit {
        /// Content ID
        id: u64,

        /// New content text
        #[arg(short, long, conflicts_with = "file")]
        content: Option<String>,

        /// Read the new content from a file
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Set a content item's review status
    SetStatus {
        /// Content ID
        id: u64,

        /// pending_review, approved or rejected
        status: ContentStatus,
    },
    /// Remove a content item from the queue
    Remove {
        /// Content ID
        id: u64,
    },
    /// Publish an approved content item
    Publish {
        /// Content ID
        id: u64,
    },
}

/// Handle queue commands
pub async fn handle_queue_command(
    command: QueueCommands,
    client: &OrchestratorClient,
) -> Result<()> {
    match command {
        QueueCommands::List => list_queue(client).await,
        QueueCommands::Show { id } => show_item(client, id).await,
        QueueCommands::Approve { id } => set_status(client, id, ContentStatus::Approved).await,
        QueueCommands::Reject { id } => set_status(client, id, ContentStatus::Rejected).await,
        QueueCommands::SetStatus { id, status } => set_status(client, id, status).await,
        QueueCommands::Edit { id, content, file } => {
            let content = match (content, file) {
                (Some(content), _) => content,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read content file: {}", path))?,
                (None, None) => anyhow::bail!("Provide the new content with --content or --file"),
            };
            edit_item(client, id, content).await
        }
        QueueCommands::Remove { id } => remove_item(client, id).await,
        QueueCommands::Publish { id } => publish_item(client, id).await,
    }
}

/// List all queued content
async fn list_queue(client: &OrchestratorClient) -> Result<()> {
    let response = client.list_queue().await?;

    if response.queue.is_empty() {
        println!("{}", "Content queue is empty.".yellow());
    } else {
        println!("{}", format!("Found {} item(s):", response.total).bold());
        println!();
        for item in &response.queue {
            print_item_summary(item);
        }
    }

    Ok(())
}

async fn show_item(client: &OrchestratorClient, id: u64) -> Result<()> {
    let item = client.get_item(id).await?;
    print_item_details(&item);
    Ok(())
}

async fn set_status(client: &OrchestratorClient, id: u64, status: ContentStatus) -> Result<()> {
    let req = UpdateContent {
        status: Some(status),
        content: None,
    };
    let item = client.update_item(id, &req).await?;

    println!(
        "{}",
        format!("✓ Content {} is now {}", item.id, item.status)
            .green()
            .bold()
    );
    Ok(())
}

async fn edit_item(client: &OrchestratorClient, id: u64, content: String) -> Result<()> {
    let req = UpdateContent {
        status: None,
        content: Some(content),
    };
    let item = client.update_item(id, &req).await?;

    println!("{}", format!("✓ Content {} updated", item.id).green().bold());
    println!("  Length: {} chars", item.body().chars().count());
    Ok(())
}

async fn remove_item(client: &OrchestratorClient, id: u64) -> Result<()> {
    let item = client.delete_item(id).await?;

    println!(
        "{}",
        format!("✓ Content {} ({}) removed", item.id, item.topic)
            .green()
            .bold()
    );
    Ok(())
}

async fn publish_item(client: &OrchestratorClient, id: u64) -> Result<()> {
    let item = match client.publish(id).await {
        Ok(item) => item,
        Err(e) if e.is_client_error() && !e.is_not_found() => {
            println!(
                "{}",
                format!("✗ {}", e.api_message().unwrap_or("Publish refused"))
                    .red()
                    .bold()
            );
            println!(
                "  Approve it first: {}",
                format!("quill queue approve {}", id).cyan()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", "✓ Content published!".green().bold());
    println!("  ID:    {}", item.id.to_string().cyan());
    println!("  Topic: {}", item.topic.bold());
    if let Some(published_at) = item.published_at {
        println!("  At:    {}", published_at.format("%Y-%m-%d %H:%M:%S"));
    }
    Ok(())
}

fn colorize_status(status: ContentStatus) -> ColoredString {
    let label = status.as_str();
    match status {
        ContentStatus::PendingReview => label.yellow(),
        ContentStatus::Approved => label.green(),
        ContentStatus::Rejected => label.red(),
        ContentStatus::Published => label.cyan(),
    }
}

/// Print a one-item summary
fn print_item_summary(item: &ContentItem) {
    println!("  {} {}", "▸".cyan(), item.topic.bold());
    println!("    ID:        {}", item.id.to_string().dimmed());
    println!("    Status:    {}", colorize_status(item.status));
    println!(
        "    Generated: {}",
        item.generated_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if item.content.is_some() {
        println!("    {}", "(edited)".dimmed());
    }
    println!();
}

/// Print a content item in full
fn print_item_details(item: &ContentItem) {
    println!("{}", "Content Details:".bold());
    println!("  ID:        {}", item.id.to_string().cyan());
    println!("  Topic:     {}", item.topic.bold());
    println!("  Status:    {}", colorize_status(item.status));
    println!(
        "  Generated: {}",
        item.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(updated_at) = item.updated_at {
        println!("  Updated:   {}", updated_at.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(published_at) = item.published_at {
        println!("  Published: {}", published_at.format("%Y-%m-%d %H:%M:%S"));
    }

    let heading = if item.content.is_some() {
        "Content (edited):"
    } else {
        "Content:"
    };
    println!("\n{}", heading.bold());
    println!("{}", "─".repeat(80).dimmed());
    println!("{}", item.body());
    println!("{}", "─".repeat(80).dimmed());
}
