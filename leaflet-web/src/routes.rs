//! Route definitions for the Leaflet web server

use crate::{handlers, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::path::PathBuf;
use tower_http::services::ServeDir;

/// Health check and JSON API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/config", get(handlers::get_config))
        .route("/api/analyze", post(handlers::analyze_project))
        .route("/api/history", get(handlers::get_history))
        .route("/api/download/{id}", get(handlers::download_analysis))
        .route("/api/analysis/{id}", delete(handlers::delete_analysis))
}

/// Hosted documentation under `/docs`
pub fn hosted_routes(hosted_dir: PathBuf) -> Router<AppState> {
    Router::new().nest_service("/docs", ServeDir::new(hosted_dir))
}
