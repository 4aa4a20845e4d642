//! Shared application state

use crate::storage::AnalysisStore;
use crate::WebConfig;
use leaflet_docs::{AnalyzerProvider, GeminiProvider};
use leaflet_inventory::RepoImporter;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WebConfig>,
    /// Finished analyses
    pub store: AnalysisStore,
    /// Clones and copies projects before analysis
    pub importer: Arc<RepoImporter>,
    /// Creates the model client for each request
    pub provider: Arc<dyn AnalyzerProvider>,
}

impl AppState {
    /// State backed by the Gemini API
    pub fn new(config: WebConfig) -> Self {
        Self::with_provider(config, Arc::new(GeminiProvider::new()))
    }

    pub fn with_provider(config: WebConfig, provider: Arc<dyn AnalyzerProvider>) -> Self {
        Self {
            store: AnalysisStore::new(&config.output_dir),
            importer: Arc::new(RepoImporter::new(&config.temp_dir)),
            config: Arc::new(config),
            provider,
        }
    }

    /// Remove imported projects older than the configured age
    pub async fn cleanup_old_data(&self) -> usize {
        let removed = self
            .importer
            .cleanup_temp_files(self.config.temp_max_age)
            .await;
        if removed > 0 {
            info!(removed, "🧹 Removed stale imported projects");
        }
        removed
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
