//! Project analysis handler

use super::types::{AnalyzeRequest, AnalyzeResponse, ErrorResponse};
use crate::storage::download_url;
use crate::{AppState, WebError, WebResult};
use axum::{extract::State, response::Json};
use leaflet_core::OutputFormat;
use leaflet_docs::DocumentationGenerator;
use std::path::{Path, PathBuf};
use tracing::info;

/// Import the requested project into the temp directory
async fn import_project(state: &AppState, request: &AnalyzeRequest) -> WebResult<PathBuf> {
    let repo_url = request.repo_url.as_deref().filter(|url| !url.trim().is_empty());
    let project_path = request
        .project_path
        .as_deref()
        .filter(|path| !path.trim().is_empty());

    if let Some(repo_url) = repo_url {
        info!(repo_url = %repo_url, branch = %request.branch, "🔄 Importing repository");
        return state
            .importer
            .import_repository(repo_url, &request.branch)
            .await
            .map_err(|e| WebError::BadRequest(format!("Failed to import repository: {e}")));
    }

    let Some(project_path) = project_path else {
        return Err(WebError::BadRequest(
            "Either projectPath or repoUrl is required".to_string(),
        ));
    };

    let source = Path::new(project_path);
    if !tokio::fs::try_exists(source).await.unwrap_or(false) {
        return Err(WebError::BadRequest("Project path does not exist".to_string()));
    }

    info!(path = %source.display(), "🔄 Importing local directory");
    state
        .importer
        .import_local_directory(source)
        .await
        .map_err(|e| WebError::BadRequest(format!("Failed to import local directory: {e}")))
}

/// Analyze a project and store the generated documentation
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "Analysis",
    summary = "Analyze a project",
    description = "Import a local directory or git repository, analyze it with the model and store the documentation",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Documentation generated", body = AnalyzeResponse),
        (status = 400, description = "Missing API key, missing source or import failure", body = ErrorResponse),
        (status = 500, description = "Analysis failed", body = ErrorResponse)
    )
)]
pub async fn analyze_project(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> WebResult<Json<AnalyzeResponse>> {
    let mut ai_config = state.config.ai.clone();
    if let Some(key) = request.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        ai_config.api_key = key.to_string();
    }
    if let Some(model) = request.model.as_deref().filter(|m| !m.trim().is_empty()) {
        ai_config.model = model.to_string();
    }
    if !ai_config.has_api_key() {
        return Err(WebError::BadRequest("Gemini API key is required".to_string()));
    }

    let imported = import_project(&state, &request).await?;
    let analyzer = state.provider.create(&ai_config)?;
    let format = request.output_format;

    let generator = DocumentationGenerator::new(&imported, analyzer, request.documentation_config())?
        .with_ignore_patterns(&state.config.inventory.extra_ignore_patterns)?
        .with_sample_budget(state.config.inventory.sample_budget);

    let result = generator.generate_documentation().await;
    let (analysis, documentation) = match (result.success, result.data) {
        (true, Some(analysis)) => (analysis, result.documentation),
        _ => {
            return Err(WebError::Analysis {
                message: result
                    .error
                    .unwrap_or_else(|| "Documentation generation failed".to_string()),
                processing_time: result.processing_time,
            })
        }
    };

    let (id, entry_dir) = state.store.create_entry().await?;
    let output_path = entry_dir.join(format!("analysis.{}", format.extension()));
    generator
        .save_documentation(&analysis, documentation.as_deref(), &output_path)
        .await?;
    if format != OutputFormat::Json {
        // history and download read the JSON record
        state.store.write_analysis(&entry_dir, &analysis).await?;
    }

    if request.generate_templates {
        generator
            .generate_templates(&analysis, &entry_dir.join("templates"))
            .await?;
    }

    let hosted_url = if request.host_on_leaflet {
        state.store.host(&id, &state.config.hosted_dir).await?;
        Some(format!("/docs/{id}/analysis.{}", format.extension()))
    } else {
        None
    };

    info!(
        id = %id,
        project = %analysis.project_name,
        processing_time_ms = result.processing_time,
        "✅ Analysis stored"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        data: analysis,
        processing_time: result.processing_time,
        output_path: output_path.display().to_string(),
        download_url: download_url(&id),
        imported_path: imported.display().to_string(),
        hosted_url,
    }))
}
