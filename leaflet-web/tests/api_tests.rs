//! API tests driving the router with `tower::ServiceExt::oneshot`

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use leaflet_core::{AiConfig, DocumentationConfig, LeafletError, LeafletResult};
use leaflet_docs::{AiInsights, AnalyzerProvider, ProjectAnalysis, SemanticAnalyzer};
use leaflet_inventory::FileStructure;
use leaflet_web::{create_app, AppState, WebConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct StubAnalyzer {
    fail: bool,
}

#[async_trait]
impl SemanticAnalyzer for StubAnalyzer {
    async fn analyze_project(
        &self,
        _structure: &FileStructure,
        _source_sample: &str,
    ) -> LeafletResult<AiInsights> {
        if self.fail {
            return Err(LeafletError::ai("model exploded", Some("stub")));
        }
        Ok(AiInsights {
            project_name: Some("stub-project".to_string()),
            description: Some("A stubbed project".to_string()),
            technology: Some(vec!["Python".to_string()]),
            ..AiInsights::default()
        })
    }

    async fn generate_documentation(
        &self,
        analysis: &ProjectAnalysis,
        _config: &DocumentationConfig,
    ) -> LeafletResult<String> {
        Ok(format!("# {}\n\nGenerated docs.\n", analysis.project_name))
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

struct StubProvider {
    fail: bool,
}

impl AnalyzerProvider for StubProvider {
    fn create(&self, _config: &AiConfig) -> LeafletResult<Arc<dyn SemanticAnalyzer>> {
        Ok(Arc::new(StubAnalyzer { fail: self.fail }))
    }
}

struct TestApp {
    app: Router,
    data: TempDir,
    project: TempDir,
}

impl TestApp {
    fn new(fail: bool) -> Self {
        let data = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(project.path().join("main.py"), "print('hi')\nprint('bye')\n").unwrap();
        std::fs::write(project.path().join("README.md"), "# readme\n").unwrap();

        let config = WebConfig::default().with_data_dir(data.path());
        let state = AppState::with_provider(config, Arc::new(StubProvider { fail }));
        Self {
            app: create_app(state),
            data,
            project,
        }
    }

    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn analyze(&self, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, "/api/analyze", Some(body)).await
    }

    fn project_path(&self) -> String {
        self.project.path().display().to_string()
    }
}

#[tokio::test]
async fn test_health_and_config() {
    let app = TestApp::new(false);

    let (status, body) = app.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.request(Method::GET, "/api/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKey"], "Not set");
    assert_eq!(body["model"], "gemini-1.5-flash");
    assert_eq!(body["maxTokens"], 4000);
    assert_eq!(body["supportedFormats"], json!(["json", "markdown", "html"]));
    assert_eq!(body["supportedTones"], json!(["technical", "friendly", "formal"]));
}

#[tokio::test]
async fn test_analyze_requires_api_key() {
    let app = TestApp::new(false);

    let (status, body) = app.analyze(json!({"projectPath": app.project_path()})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Gemini API key is required");
}

#[tokio::test]
async fn test_analyze_requires_a_source() {
    let app = TestApp::new(false);

    let (status, body) = app.analyze(json!({"apiKey": "k"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Either projectPath or repoUrl is required");

    let missing = app.data.path().join("nope").display().to_string();
    let (status, body) = app.analyze(json!({"apiKey": "k", "projectPath": missing})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Project path does not exist");
}

#[tokio::test]
async fn test_analyze_store_download_delete() {
    let app = TestApp::new(false);

    let (status, body) = app
        .analyze(json!({
            "apiKey": "k",
            "projectPath": app.project_path(),
            "outputFormat": "markdown",
            "generateTemplates": true,
            "hostOnLeaflet": true
        }))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["projectName"], "stub-project");
    assert_eq!(body["data"]["structure"]["totalFiles"], 2);
    assert!(body["outputPath"].as_str().unwrap().ends_with("analysis.md"));

    let download_url = body["downloadUrl"].as_str().unwrap().to_string();
    let id = download_url.trim_start_matches("/api/download/").to_string();
    assert_eq!(body["hostedUrl"], format!("/docs/{id}/analysis.md"));

    let entry = app.data.path().join("output").join(&id);
    assert!(std::fs::read_to_string(entry.join("analysis.md"))
        .unwrap()
        .starts_with("# stub-project"));
    assert!(entry.join("analysis.json").is_file());
    assert!(entry.join("templates/README.md").is_file());

    let (status, history) = app.request(Method::GET, "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["id"], id);
    assert_eq!(history[0]["technologies"], json!(["Python"]));

    let (status, stored) = app.request(Method::GET, &download_url, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["projectName"], "stub-project");

    let (status, deleted) = app
        .request(Method::DELETE, &format!("/api/analysis/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);

    let (status, _) = app.request(Method::GET, &download_url, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .request(Method::DELETE, &format!("/api/analysis/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hosted_documentation_is_served() {
    let app = TestApp::new(false);

    let (_, body) = app
        .analyze(json!({
            "apiKey": "k",
            "projectPath": app.project_path(),
            "outputFormat": "markdown",
            "hostOnLeaflet": true
        }))
        .await;
    let hosted_url = body["hostedUrl"].as_str().unwrap().to_string();

    let response = app
        .app
        .clone()
        .oneshot(Request::builder().uri(&hosted_url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("Generated docs."));
}

#[tokio::test]
async fn test_failed_analysis_is_a_server_error() {
    let app = TestApp::new(true);

    let (status, body) = app
        .analyze(json!({"apiKey": "k", "projectPath": app.project_path()}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("model exploded"));
    assert!(body["processingTime"].is_u64());

    let (_, history) = app.request(Method::GET, "/api/history", None).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_malformed_ids_are_rejected() {
    let app = TestApp::new(false);

    let (status, _) = app.request(Method::GET, "/api/download/a..b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.request(Method::GET, "/api/download/12345", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new(false);

    let (status, body) = app.request(Method::GET, "/api/swagger.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Leaflet API");
    assert!(body["paths"]["/api/history"].is_object());
}
