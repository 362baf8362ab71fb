//! Generator command handlers
//!
//! Generator configuration and the published output listing.

use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use colored::*;
use quill_client::OrchestratorClient;
use quill_core::dto::config::ConfigPatch;
use serde_json::{Map, Value as JsonValue};

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the generator configuration (credentials are never shown)
    Show,
    /// Update keys in one configuration section
    Set {
        /// Section to update
        #[arg(value_enum)]
        section: Section,

        /// Values as Key=value pairs (e.g., Model=llama-3 MaxTokens=4096)
        #[arg(required = true, value_parser = parse_key_val)]
        values: Vec<(String, String)>,
    },
}

/// Configuration sections that accept updates
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Section {
    #[value(name = "lmstudio")]
    LmStudio,
    #[value(name = "wordpress")]
    WordPress,
    Defaults,
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Interpret a value as JSON when it parses, as a plain string otherwise
fn parse_value(raw: &str) -> JsonValue {
    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

fn build_patch(section: Section, values: Vec<(String, String)>) -> ConfigPatch {
    let updates: Map<String, JsonValue> = values
        .into_iter()
        .map(|(k, v)| {
            let value = parse_value(&v);
            (k, value)
        })
        .collect();

    let mut patch = ConfigPatch::default();
    match section {
        Section::LmStudio => patch.lm_studio = Some(updates),
        Section::WordPress => patch.word_press = Some(updates),
        Section::Defaults => patch.defaults = Some(updates),
    }
    patch
}

/// Handle config commands
pub async fn handle_config_command(
    command: ConfigCommands,
    client: &OrchestratorClient,
) -> Result<()> {
    match command {
        ConfigCommands::Show => show_config(client).await,
        ConfigCommands::Set { section, values } => {
            let response = client.update_config(&build_patch(section, values)).await?;
            println!("{}", format!("✓ {}", response.message).green().bold());
            Ok(())
        }
    }
}

async fn show_config(client: &OrchestratorClient) -> Result<()> {
    let config = client.get_config().await?;

    println!("{}", "LM Studio:".bold());
    print_field("ApiUrl", &config.lm_studio.api_url);
    print_field("Model", &config.lm_studio.model);
    print_field("MaxTokens", &config.lm_studio.max_tokens);
    print_field("Temperature", &config.lm_studio.temperature);

    println!("\n{}", "WordPress:".bold());
    print_field("Enabled", &config.word_press.enabled);
    print_field("SiteUrl", &config.word_press.site_url);
    print_field("DefaultStatus", &config.word_press.default_status);
    print_field("Categories", &config.word_press.categories);
    print_field("Tags", &config.word_press.tags);
    println!(
        "  {:<14} {}",
        "Credentials",
        if config.word_press.credentials_set {
            "set".green()
        } else {
            "missing".yellow()
        }
    );

    println!("\n{}", "Revenue:".bold());
    print_field("AdSense", &config.revenue.ad_sense.enabled);
    println!(
        "  {:<14} {}",
        "Affiliates",
        format!("{} program(s)", config.revenue.affiliates.program_count).dimmed()
    );

    if let Some(defaults) = &config.defaults {
        println!("\n{}", "Defaults:".bold());
        println!("{}", serde_json::to_string_pretty(defaults)?);
    }

    Ok(())
}

fn print_field(name: &str, value: &Option<JsonValue>) {
    let shown = match value {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    };
    println!("  {:<14} {}", name, shown.cyan());
}

/// List published output files
pub async fn list_output(client: &OrchestratorClient) -> Result<()> {
    let listing = client.list_output().await?;

    println!("{} {}", "Output directory:".bold(), listing.output_path.dimmed());
    if listing.files.is_empty() {
        println!("{}", "No published files yet.".yellow());
        return Ok(());
    }

    println!();
    for file in &listing.files {
        let modified = file
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {:<50} {:>10}  {}",
            "▸".cyan(),
            file.name,
            format!("{} B", file.size),
            modified.dimmed()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("ApiUrl=http://host:1234/v1?a=b").unwrap(),
            ("ApiUrl".to_string(), "http://host:1234/v1?a=b".to_string())
        );
        assert!(parse_key_val("Model").is_err());
    }

    #[test]
    fn test_values_are_typed_when_they_parse_as_json() {
        let patch = build_patch(
            Section::LmStudio,
            vec![
                ("MaxTokens".to_string(), "4096".to_string()),
                ("Model".to_string(), "llama-3".to_string()),
                ("Stream".to_string(), "true".to_string()),
            ],
        );

        let section = patch.lm_studio.unwrap();
        assert_eq!(section["MaxTokens"], 4096);
        assert_eq!(section["Model"], "llama-3");
        assert_eq!(section["Stream"], true);
        assert!(patch.word_press.is_none());
    }
}
