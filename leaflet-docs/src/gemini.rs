//! Gemini `generateContent` client

use crate::ai::SemanticAnalyzer;
use crate::prompts::{build_analysis_prompt, build_documentation_prompt, parse_analysis_response};
use crate::types::{AiInsights, ProjectAnalysis};
use async_trait::async_trait;
use futures::FutureExt;
use leaflet_core::{
    retry_async_if, AiConfig, DocumentationConfig, ErrorContext, LeafletError, LeafletResult,
    RetryConfig,
};
use leaflet_inventory::FileStructure;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const RATE_LIMIT_ATTEMPTS: usize = 3;
const RATE_LIMIT_WAIT_MS: u64 = 30_000;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn is_rate_limited(status: reqwest::StatusCode, body: &str) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || body.contains("Too Many Requests")
        || body.contains("RESOURCE_EXHAUSTED")
}

/// HTTP client for one model configuration
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: AiConfig,
    base_url: String,
    rate_limit_retry: RetryConfig,
}

impl GeminiClient {
    pub fn new(config: AiConfig) -> LeafletResult<Self> {
        if !config.has_api_key() {
            return Err(LeafletError::Validation {
                message: "A Gemini API key is required".to_string(),
                field: Some("apiKey".to_string()),
                context: ErrorContext::new("ai_service")
                    .with_suggestion("Set GEMINI_API_KEY or pass an API key explicitly"),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("leaflet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LeafletError::ai(format!("Failed to create HTTP client: {e}"), None))?;

        Ok(Self {
            http,
            config,
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit_retry: RetryConfig::fixed(RATE_LIMIT_ATTEMPTS, RATE_LIMIT_WAIT_MS),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override how rate-limited requests are retried
    pub fn with_rate_limit_retry(mut self, retry: RetryConfig) -> Self {
        self.rate_limit_retry = retry;
        self
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.config.model
        )
    }

    /// Send one prompt and return the concatenated text of the first candidate
    pub async fn generate(&self, prompt: &str) -> LeafletResult<String> {
        let model = self.config.model.as_str();
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        debug!(model, prompt_bytes = prompt.len(), "Sending generateContent request");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LeafletError::ai(format!("Request failed: {e}"), Some(model)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LeafletError::ai(format!("Failed to read response: {e}"), Some(model)))?;

        if !status.is_success() {
            if is_rate_limited(status, &body) {
                return Err(LeafletError::RateLimit {
                    message: format!("Rate limited by the model API ({status})"),
                    retry_after_ms: Some(self.rate_limit_retry.delay_ms),
                    context: ErrorContext::new("ai_service")
                        .with_operation("generate")
                        .with_suggestion("Wait a moment and try again"),
                });
            }

            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(LeafletError::ai(format!("{status}: {message}"), Some(model)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| LeafletError::ai(format!("Malformed response: {e}"), Some(model)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LeafletError::ai("Model returned an empty response", Some(model)));
        }
        Ok(text)
    }

    /// [`GeminiClient::generate`], retrying only when rate limited
    async fn generate_with_retry(&self, prompt: String, operation: &str) -> LeafletResult<String> {
        let client = self.clone();
        let prompt = Arc::new(prompt);

        retry_async_if(
            move || {
                let client = client.clone();
                let prompt = Arc::clone(&prompt);
                async move { client.generate(&prompt).await }.boxed()
            },
            |error| matches!(error, LeafletError::RateLimit { .. }),
            self.rate_limit_retry.clone(),
            operation,
        )
        .await
    }
}

#[async_trait]
impl SemanticAnalyzer for GeminiClient {
    async fn analyze_project(
        &self,
        structure: &FileStructure,
        source_sample: &str,
    ) -> LeafletResult<AiInsights> {
        info!(model = %self.config.model, "🤖 Running AI analysis");
        let prompt = build_analysis_prompt(structure, source_sample);
        let reply = self.generate_with_retry(prompt, "ai_analysis").await?;
        parse_analysis_response(&reply)
    }

    async fn generate_documentation(
        &self,
        analysis: &ProjectAnalysis,
        config: &DocumentationConfig,
    ) -> LeafletResult<String> {
        info!(model = %self.config.model, "📄 Generating documentation");
        let prompt = build_documentation_prompt(analysis, config);
        self.generate(&prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
