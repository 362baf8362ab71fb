//! Generator Config Service
//!
//! Reads and updates the generator's `Config.json`. Reads return a sanitized
//! view with credentials reduced to flags; updates shallow-merge whole
//! sections and rewrite the file.

use quill_core::dto::config::{
    AdSenseView, AffiliatesView, ConfigPatch, GeneratorConfigView, LmStudioView, RevenueView,
    WordPressView,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

/// File name of the generator configuration inside its core directory
pub const CONFIG_FILE_NAME: &str = "Config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read pipeline config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse pipeline config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write pipeline config {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline config {} is not a JSON object", .path.display())]
    NotAnObject { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Access to the generator configuration file
pub struct GeneratorConfigService {
    path: PathBuf,
    /// Serializes read-merge-write cycles
    lock: Mutex<()>,
}

impl GeneratorConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Service for `Config.json` inside the generator's core directory
    pub fn in_core_dir(core_dir: &Path) -> Self {
        Self::new(core_dir.join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sanitized configuration
    pub async fn get(&self) -> Result<GeneratorConfigView> {
        let config = self.load().await?;
        Ok(sanitize(&config))
    }

    /// Merge `patch` into the stored configuration
    pub async fn update(&self, patch: ConfigPatch) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut config = self.load().await?;
        let root = config
            .as_object_mut()
            .ok_or_else(|| ConfigError::NotAnObject {
                path: self.path.clone(),
            })?;

        let sections = [
            ("LMStudio", patch.lm_studio),
            ("WordPress", patch.word_press),
            ("Defaults", patch.defaults),
        ];
        for (key, updates) in sections {
            if let Some(updates) = updates {
                merge_section(root, key, updates);
            }
        }

        self.store(&config).await?;
        tracing::info!("Pipeline config updated at {}", self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Value> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ConfigError::Read {
                path: self.path.clone(),
                source,
            })?;

        // Editors on Windows like to leave a byte order mark behind
        let raw = raw.trim_start_matches('\u{feff}');

        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn store(&self, config: &Value) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        config
            .serialize(&mut ser)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tokio::fs::write(&self.path, buf)
            .await
            .map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// Shallow merge: keys in `updates` replace the section's keys
fn merge_section(root: &mut Map<String, Value>, key: &str, updates: Map<String, Value>) {
    let section = root
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));

    match section {
        Value::Object(existing) => existing.extend(updates),
        other => *other = Value::Object(updates),
    }
}

fn sanitize(config: &Value) -> GeneratorConfigView {
    let lm = &config["LMStudio"];
    let wp = &config["WordPress"];
    let adsense = &config["Revenue"]["AdSense"];
    let affiliates = &config["Revenue"]["Affiliates"];

    GeneratorConfigView {
        lm_studio: LmStudioView {
            api_url: field(lm, "ApiUrl"),
            model: field(lm, "Model"),
            max_tokens: field(lm, "MaxTokens"),
            temperature: field(lm, "Temperature"),
        },
        word_press: WordPressView {
            enabled: field(wp, "Enabled"),
            site_url: field(wp, "SiteUrl"),
            default_status: field(wp, "DefaultStatus"),
            categories: field(wp, "Categories"),
            tags: field(wp, "Tags"),
            credentials_set: is_set(&wp["Username"]) && is_set(&wp["AppPassword"]),
        },
        revenue: RevenueView {
            ad_sense: AdSenseView {
                enabled: field(adsense, "Enabled"),
                configured: is_set(&adsense["ClientId"]),
            },
            affiliates: AffiliatesView {
                enabled: field(affiliates, "Enabled"),
                program_count: affiliates["Programs"].as_array().map_or(0, Vec::len),
            },
        },
        paths: field(config, "Paths"),
        defaults: field(config, "Defaults"),
    }
}

fn field(section: &Value, key: &str) -> Option<Value> {
    section.get(key).filter(|v| !v.is_null()).cloned()
}

/// Whether a value counts as filled in
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "LMStudio": {
                "ApiUrl": "http://localhost:1234/v1",
                "Model": "local-model",
                "MaxTokens": 4096,
                "Temperature": 0.7
            },
            "WordPress": {
                "Enabled": true,
                "SiteUrl": "https://blog.example.com",
                "Username": "editor",
                "AppPassword": "",
                "DefaultStatus": "draft",
                "Categories": ["tech"],
                "Tags": []
            },
            "Revenue": {
                "AdSense": { "Enabled": false, "ClientId": "ca-pub-1" },
                "Affiliates": { "Enabled": true, "Programs": [{ "Name": "a" }, { "Name": "b" }] }
            },
            "Paths": { "Output": "../data/published" },
            "Defaults": { "WordCount": 1200 }
        })
    }

    async fn write_config(dir: &Path, value: &Value) -> GeneratorConfigService {
        let service = GeneratorConfigService::in_core_dir(dir);
        tokio::fs::write(service.path(), serde_json::to_string(value).unwrap())
            .await
            .unwrap();
        service
    }

    #[test]
    fn test_sanitize_hides_credentials() {
        let view = sanitize(&sample());

        assert_eq!(view.lm_studio.model, Some(json!("local-model")));
        assert!(!view.word_press.credentials_set);
        assert!(view.revenue.ad_sense.configured);
        assert_eq!(view.revenue.affiliates.program_count, 2);
        assert_eq!(view.defaults, Some(json!({ "WordCount": 1200 })));

        let serialized = serde_json::to_string(&view).unwrap();
        assert!(!serialized.contains("editor"));
        assert!(!serialized.contains("AppPassword"));
    }

    #[test]
    fn test_sanitize_tolerates_missing_sections() {
        let view = sanitize(&json!({}));
        assert_eq!(view, GeneratorConfigView::default());
    }

    #[tokio::test]
    async fn test_update_merges_sections_and_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let service = write_config(dir.path(), &sample()).await;

        let patch: ConfigPatch = serde_json::from_value(json!({
            "LMStudio": { "Model": "bigger-model" },
            "WordPress": { "AppPassword": "secret" },
            "Revenue": { "AdSense": { "Enabled": true } }
        }))
        .unwrap();
        service.update(patch).await.unwrap();

        let raw = tokio::fs::read_to_string(service.path()).await.unwrap();
        assert!(raw.contains("\n    \"LMStudio\""));

        let stored: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored["LMStudio"]["Model"], "bigger-model");
        assert_eq!(stored["LMStudio"]["MaxTokens"], 4096);
        assert_eq!(stored["WordPress"]["AppPassword"], "secret");
        // Sections outside the patchable set are untouched
        assert_eq!(stored["Revenue"]["AdSense"]["Enabled"], false);

        assert!(service.get().await.unwrap().word_press.credentials_set);
    }

    #[tokio::test]
    async fn test_update_creates_missing_section() {
        let dir = tempfile::tempdir().unwrap();
        let service = write_config(dir.path(), &json!({ "LMStudio": {} })).await;

        let patch: ConfigPatch =
            serde_json::from_value(json!({ "Defaults": { "Language": "en" } })).unwrap();
        service.update(patch).await.unwrap();

        let view = service.get().await.unwrap();
        assert_eq!(view.defaults, Some(json!({ "Language": "en" })));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = GeneratorConfigService::in_core_dir(dir.path());

        assert!(matches!(service.get().await, Err(ConfigError::Read { .. })));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = GeneratorConfigService::in_core_dir(dir.path());
        tokio::fs::write(service.path(), "{ not json").await.unwrap();

        assert!(matches!(service.get().await, Err(ConfigError::Parse { .. })));
    }
}
