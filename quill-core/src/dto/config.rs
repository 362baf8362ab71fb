//! Generator configuration DTOs
//!
//! The generator keeps its settings in a PascalCase JSON file. These types
//! describe the sanitized view the orchestrator exposes and the partial
//! update it accepts. Credentials never leave the orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sanitized view of the generator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfigView {
    #[serde(rename = "LMStudio")]
    pub lm_studio: LmStudioView,
    #[serde(rename = "WordPress")]
    pub word_press: WordPressView,
    #[serde(rename = "Revenue")]
    pub revenue: RevenueView,
    #[serde(rename = "Paths")]
    pub paths: Option<Value>,
    #[serde(rename = "Defaults")]
    pub defaults: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LmStudioView {
    pub api_url: Option<Value>,
    pub model: Option<Value>,
    pub max_tokens: Option<Value>,
    pub temperature: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WordPressView {
    pub enabled: Option<Value>,
    pub site_url: Option<Value>,
    pub default_status: Option<Value>,
    pub categories: Option<Value>,
    pub tags: Option<Value>,
    #[serde(rename = "credentialsSet")]
    pub credentials_set: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueView {
    #[serde(rename = "AdSense")]
    pub ad_sense: AdSenseView,
    #[serde(rename = "Affiliates")]
    pub affiliates: AffiliatesView,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdSenseView {
    #[serde(rename = "Enabled")]
    pub enabled: Option<Value>,
    pub configured: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffiliatesView {
    #[serde(rename = "Enabled")]
    pub enabled: Option<Value>,
    #[serde(rename = "programCount")]
    pub program_count: usize,
}

/// Partial update of the generator configuration
///
/// Each present section is shallow-merged into the stored section; keys
/// outside these three sections are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(rename = "LMStudio", default, skip_serializing_if = "Option::is_none")]
    pub lm_studio: Option<Map<String, Value>>,
    #[serde(rename = "WordPress", default, skip_serializing_if = "Option::is_none")]
    pub word_press: Option<Map<String, Value>>,
    #[serde(rename = "Defaults", default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Map<String, Value>>,
}
