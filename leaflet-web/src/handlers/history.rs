//! Stored analysis handlers

use super::types::{ErrorResponse, SuccessResponse};
use crate::storage::HistoryEntry;
use crate::{AppState, WebResult};
use axum::{
    extract::{Path, State},
    response::Json,
};

/// List stored analyses
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "Analysis",
    summary = "Analysis history",
    description = "Stored analyses, newest first",
    responses(
        (status = 200, description = "History retrieved", body = [HistoryEntry]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn get_history(State(state): State<AppState>) -> WebResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.store.list_history().await?))
}

/// Download a stored analysis
#[utoipa::path(
    get,
    path = "/api/download/{id}",
    tag = "Analysis",
    summary = "Download analysis",
    description = "The stored analysis as JSON",
    params(
        ("id" = String, Path, description = "Analysis id")
    ),
    responses(
        (status = 200, description = "Stored analysis"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Analysis not found", body = ErrorResponse)
    )
)]
pub async fn download_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<serde_json::Value>> {
    Ok(Json(state.store.load_analysis(&id).await?))
}

/// Delete a stored analysis
#[utoipa::path(
    delete,
    path = "/api/analysis/{id}",
    tag = "Analysis",
    summary = "Delete analysis",
    params(
        ("id" = String, Path, description = "Analysis id")
    ),
    responses(
        (status = 200, description = "Analysis deleted", body = SuccessResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Analysis not found", body = ErrorResponse)
    )
)]
pub async fn delete_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<SuccessResponse>> {
    state.store.delete(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
