//! Leaflet Web Server
//!
//! HTTP API for analyzing projects and serving the generated documentation.

pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;
pub mod storage;

// Re-export main types
pub use server::{LeafletServer, LeafletServerBuilder};
pub use state::AppState;
pub use storage::{AnalysisStore, HistoryEntry};

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use leaflet_core::{AiConfig, InventoryConfig, LeafletConfig, LeafletError};
use std::path::PathBuf;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Maximum accepted request body
pub const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let hosted_dir = state.config.hosted_dir.clone();

    Router::new()
        .merge(routes::api_routes())
        .merge(SwaggerUi::new("/api/docs").url("/api/swagger.json", openapi::ApiDoc::openapi()))
        .merge(routes::hosted_routes(hosted_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// One directory per stored analysis
    pub output_dir: PathBuf,
    /// Imported repositories
    pub temp_dir: PathBuf,
    /// Documentation published under `/docs`
    pub hosted_dir: PathBuf,
    /// Imported repositories older than this are removed
    pub temp_max_age: Duration,
    /// Model settings used when a request does not override them
    pub ai: AiConfig,
    pub inventory: InventoryConfig,
}

impl From<&LeafletConfig> for WebConfig {
    fn from(config: &LeafletConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            output_dir: config.storage.output_dir.clone(),
            temp_dir: config.storage.temp_dir.clone(),
            hosted_dir: config.storage.hosted_dir.clone(),
            temp_max_age: Duration::from_secs(config.storage.temp_max_age_hours * 3600),
            ai: config.ai.to_ai_config(),
            inventory: config.inventory.clone(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::from(&LeafletConfig::default())
    }
}

impl WebConfig {
    /// All storage directories below `base`
    pub fn with_data_dir(mut self, base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        self.output_dir = base.join("output");
        self.temp_dir = base.join("temp");
        self.hosted_dir = base.join("hosted_docs");
        self
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The documentation pipeline ran and reported failure
    #[error("{message}")]
    Analysis { message: String, processing_time: u64 },

    #[error(transparent)]
    Leaflet(#[from] LeafletError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Leaflet(e) => match e {
                LeafletError::Validation { .. }
                | LeafletError::Import { .. }
                | LeafletError::InvalidRoot { .. }
                | LeafletError::InvalidPattern { .. } => StatusCode::BAD_REQUEST,
                LeafletError::NotFound { .. } => StatusCode::NOT_FOUND,
                LeafletError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            WebError::Server(_) | WebError::Analysis { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            match &self {
                WebError::Leaflet(e) => e.log(),
                other => error!(error = %other, "❌ Request failed"),
            }
        }

        let processing_time = match &self {
            WebError::Analysis { processing_time, .. } => Some(*processing_time),
            _ => None,
        };
        let body = handlers::ErrorResponse {
            error: self.to_string(),
            processing_time,
        };

        (status, Json(body)).into_response()
    }
}
