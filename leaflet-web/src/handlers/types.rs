//! Request and response types used by the handlers

use leaflet_core::{DocumentationConfig, OutputFormat, Tone, Verbosity, DEFAULT_BRANCH};
use leaflet_docs::ProjectAnalysis;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    /// "Set" or "Not set"
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub supported_formats: Vec<String>,
    pub supported_tones: Vec<String>,
    pub supported_verbosity: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Json
}

fn default_tone() -> Tone {
    Tone::Friendly
}

fn default_verbosity() -> Verbosity {
    Verbosity::Standard
}

/// Analyze a local directory or a remote git repository
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Local directory to analyze; copied before analysis
    #[serde(default)]
    pub project_path: Option<String>,
    /// Git repository to clone; takes precedence over `projectPath`
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default = "default_branch")]
    #[schema(example = "main")]
    pub branch: String,
    #[serde(default = "default_output_format")]
    #[schema(value_type = String, example = "json")]
    pub output_format: OutputFormat,
    #[serde(default = "default_tone")]
    #[schema(value_type = String, example = "friendly")]
    pub tone: Tone,
    #[serde(default = "default_verbosity")]
    #[schema(value_type = String, example = "standard")]
    pub verbosity: Verbosity,
    #[serde(default)]
    pub include_api_docs: bool,
    #[serde(default)]
    pub include_setup_guide: bool,
    #[serde(default)]
    pub include_inline: bool,
    /// Also write README/API/SETUP/CONTRIBUTING templates
    #[serde(default)]
    pub generate_templates: bool,
    /// Publish the output under `/docs/{id}`
    #[serde(default)]
    pub host_on_leaflet: bool,
    /// Overrides the server's key for this request
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl AnalyzeRequest {
    pub fn documentation_config(&self) -> DocumentationConfig {
        DocumentationConfig {
            output_format: self.output_format,
            include_inline: self.include_inline,
            include_api_docs: self.include_api_docs,
            include_setup_guide: self.include_setup_guide,
            tone: self.tone,
            verbosity: self.verbosity,
            ..DocumentationConfig::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: ProjectAnalysis,
    /// Milliseconds spent in the documentation pipeline
    pub processing_time: u64,
    pub output_path: String,
    pub download_url: String,
    pub imported_path: String,
    pub hosted_url: Option<String>,
}
