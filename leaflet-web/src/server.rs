//! Leaflet web server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use leaflet_docs::AnalyzerProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

pub struct LeafletServer {
    state: AppState,
}

impl LeafletServer {
    pub fn new(config: WebConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.state.config.address();

        info!("🚀 Starting Leaflet Web Server");
        info!("📍 Server address: http://{}", address);
        info!("📁 Output directory: {}", self.state.config.output_dir.display());

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);
        info!("📚 Swagger UI: http://{}/api/docs", address);

        // Imported projects are only needed while a request runs
        let cleanup_state = self.state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                cleanup_state.cleanup_old_data().await;
            }
        });

        if let Err(e) = serve(listener, app).await {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    pub fn config(&self) -> &WebConfig {
        &self.state.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for LeafletServer
pub struct LeafletServerBuilder {
    config: WebConfig,
    provider: Option<Arc<dyn AnalyzerProvider>>,
}

impl LeafletServerBuilder {
    pub fn new() -> Self {
        Self::from_config(WebConfig::default())
    }

    pub fn from_config(config: WebConfig) -> Self {
        Self {
            config,
            provider: None,
        }
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Keep output, temp and hosted directories below `dir`
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config = self.config.with_data_dir(dir);
        self
    }

    /// Use another model backend instead of Gemini
    pub fn provider(mut self, provider: Arc<dyn AnalyzerProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn build(self) -> LeafletServer {
        let state = match self.provider {
            Some(provider) => AppState::with_provider(self.config, provider),
            None => AppState::new(self.config),
        };
        LeafletServer::with_state(state)
    }
}

impl Default for LeafletServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
