//! GeminiClient against a local mock of the generateContent endpoint

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use leaflet_core::{AiConfig, LeafletError, RetryConfig};
use leaflet_docs::{GeminiClient, SemanticAnalyzer};
use leaflet_inventory::{DirectoryNode, FileStructure};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone)]
struct MockState {
    calls: Arc<AtomicUsize>,
    /// Status codes returned before a successful reply
    failures: Arc<Vec<StatusCode>>,
    reply: Arc<String>,
}

async fn generate_content(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let call = state.calls.fetch_add(1, Ordering::SeqCst);

    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "bad key"}})),
        );
    }
    if body["contents"][0]["parts"][0]["text"].as_str().is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "missing prompt"}})),
        );
    }

    if let Some(&status) = state.failures.get(call) {
        let reason = if status == StatusCode::TOO_MANY_REQUESTS {
            "RESOURCE_EXHAUSTED"
        } else {
            "INVALID_ARGUMENT"
        };
        return (
            status,
            Json(json!({"error": {"message": "nope", "status": reason}})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{"content": {"parts": [{"text": state.reply.as_str()}]}}]
        })),
    )
}

async fn spawn_mock(failures: Vec<StatusCode>, reply: &str) -> (String, Arc<AtomicUsize>) {
    let state = MockState {
        calls: Arc::new(AtomicUsize::new(0)),
        failures: Arc::new(failures),
        reply: Arc::new(reply.to_string()),
    };
    let calls = state.calls.clone();

    let app = Router::new()
        .route("/v1beta/models/{model}", post(generate_content))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1beta"), calls)
}

fn client(base_url: &str) -> GeminiClient {
    GeminiClient::new(AiConfig {
        api_key: "test-key".to_string(),
        ..AiConfig::default()
    })
    .unwrap()
    .with_base_url(base_url)
    .with_rate_limit_retry(RetryConfig::fixed(3, 1))
}

fn structure() -> FileStructure {
    FileStructure {
        root: DirectoryNode::directory(
            "demo",
            "/demo",
            vec![DirectoryNode::file("main.py", "/demo/main.py")],
        ),
        total_files: 1,
        total_lines: 3,
        language_breakdown: [(".py".to_string(), 3)].into_iter().collect(),
    }
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let (base, calls) = spawn_mock(vec![], "hello there").await;

    let text = client(&base).generate("say hi").await.unwrap();

    assert_eq!(text, "hello there");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_analysis_retries_after_rate_limit() {
    let reply = "```json\n{\"projectName\": \"demo\", \"technology\": [\"Python\"]}\n```";
    let (base, calls) = spawn_mock(vec![StatusCode::TOO_MANY_REQUESTS], reply).await;

    let insights = client(&base)
        .analyze_project(&structure(), "\n// File: main.py\nprint(1)")
        .await
        .unwrap();

    assert_eq!(insights.project_name.as_deref(), Some("demo"));
    assert_eq!(insights.technology, Some(vec!["Python".to_string()]));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_max_attempts() {
    let (base, calls) = spawn_mock(vec![StatusCode::TOO_MANY_REQUESTS; 5], "{}").await;

    let err = client(&base)
        .analyze_project(&structure(), "")
        .await
        .unwrap_err();

    assert!(matches!(err, LeafletError::RateLimit { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_other_errors_fail_immediately() {
    let (base, calls) = spawn_mock(vec![StatusCode::BAD_REQUEST], "{}").await;

    let err = client(&base)
        .analyze_project(&structure(), "")
        .await
        .unwrap_err();

    assert!(matches!(err, LeafletError::Ai { .. }));
    assert!(err.to_string().contains("nope"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unparseable_analysis_is_an_ai_error() {
    let (base, _) = spawn_mock(vec![], "I cannot help with that").await;

    let err = client(&base)
        .analyze_project(&structure(), "")
        .await
        .unwrap_err();

    assert!(matches!(err, LeafletError::Ai { .. }));
}
