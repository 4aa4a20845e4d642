//! OpenAPI document for the Leaflet web server

use utoipa::OpenApi;

use crate::handlers::{
    AnalyzeRequest, AnalyzeResponse, ConfigResponse, ErrorResponse, HealthResponse,
    SuccessResponse,
};
use crate::storage::HistoryEntry;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leaflet API",
        version = "0.1.0",
        description = "AI-assisted documentation generation for code projects"
    ),
    servers(
        (url = "http://localhost:4000", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::get_config,
        crate::handlers::analyze_project,
        crate::handlers::get_history,
        crate::handlers::download_analysis,
        crate::handlers::delete_analysis,
    ),
    components(
        schemas(
            HealthResponse,
            ConfigResponse,
            ErrorResponse,
            SuccessResponse,
            AnalyzeRequest,
            AnalyzeResponse,
            HistoryEntry,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Configuration", description = "Server configuration"),
        (name = "Analysis", description = "Project analysis and stored results"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Leaflet API");
        assert!(openapi.paths.paths.contains_key("/api/analyze"));
        assert!(openapi.paths.paths.contains_key("/api/download/{id}"));
    }
}
