//! Configuration handler

use super::types::ConfigResponse;
use crate::AppState;
use axum::{extract::State, response::Json};
use leaflet_core::{OutputFormat, Tone, Verbosity};

/// Model settings and supported documentation options
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "Configuration",
    summary = "Get server configuration",
    description = "Model settings used when a request does not override them, and the accepted option values",
    responses(
        (status = 200, description = "Configuration retrieved successfully", body = ConfigResponse)
    )
)]
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let ai = &state.config.ai;
    Json(ConfigResponse {
        api_key: if ai.has_api_key() { "Set" } else { "Not set" }.to_string(),
        model: ai.model.clone(),
        temperature: ai.temperature,
        max_tokens: ai.max_tokens,
        supported_formats: OutputFormat::ALL.iter().map(|f| f.to_string()).collect(),
        supported_tones: Tone::ALL.iter().map(|t| t.to_string()).collect(),
        supported_verbosity: Verbosity::ALL.iter().map(|v| v.to_string()).collect(),
    })
}
