//! Semantic analysis seam
//!
//! The generator only talks to a [`SemanticAnalyzer`]. Binaries pick the
//! implementation through an [`AnalyzerProvider`], which lets tests and
//! alternative backends slot in without touching the pipeline.

use crate::types::{AiInsights, ProjectAnalysis};
use async_trait::async_trait;
use leaflet_core::{AiConfig, DocumentationConfig, LeafletResult};
use leaflet_inventory::FileStructure;
use std::sync::Arc;

#[async_trait]
pub trait SemanticAnalyzer: Send + Sync {
    /// Describe the project from its structure and a source sample
    async fn analyze_project(
        &self,
        structure: &FileStructure,
        source_sample: &str,
    ) -> LeafletResult<AiInsights>;

    /// Write prose documentation for a compiled analysis
    async fn generate_documentation(
        &self,
        analysis: &ProjectAnalysis,
        config: &DocumentationConfig,
    ) -> LeafletResult<String>;

    fn model_name(&self) -> &str;
}

/// Builds analyzers from per-request model settings
pub trait AnalyzerProvider: Send + Sync {
    fn create(&self, config: &AiConfig) -> LeafletResult<Arc<dyn SemanticAnalyzer>>;
}

/// Provider backed by the Gemini REST API
#[derive(Debug, Clone, Default)]
pub struct GeminiProvider {
    base_url: Option<String>,
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point every created client at another endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
        }
    }
}

impl AnalyzerProvider for GeminiProvider {
    fn create(&self, config: &AiConfig) -> LeafletResult<Arc<dyn SemanticAnalyzer>> {
        let mut client = crate::gemini::GeminiClient::new(config.clone())?;
        if let Some(base_url) = &self.base_url {
            client = client.with_base_url(base_url.clone());
        }
        Ok(Arc::new(client))
    }
}
