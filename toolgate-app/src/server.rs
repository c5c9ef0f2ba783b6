//! Axum service front for the gateway.
//!
//! # Routes
//!
//! - `GET  /health`  - liveness: registry size, uptime, request counter
//! - `GET  /tools`   - tool catalog with serialized parameter schemas
//! - `POST /execute` - dispatch one tool call
//!
//! The registry is loaded before the router is built; handlers only ever
//! see the immutable loaded set.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use toolgate_core::{describe, AdapterRegistry, DispatchError, Dispatcher, SchemaTable};

/// Shared state: the loaded registry plus the front's own counters.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<AdapterRegistry>,
    dispatcher: Arc<Dispatcher>,
    schemas: Arc<SchemaTable>,
    started: Instant,
    request_count: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(registry: Arc<AdapterRegistry>, schemas: SchemaTable) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));
        Self {
            registry,
            dispatcher,
            schemas: Arc::new(schemas),
            started: Instant::now(),
            request_count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn schemas(&self) -> &SchemaTable {
        &self.schemas
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/tools", get(list_tools_handler))
        .route("/execute", post(execute_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health - read-only, does not count as a request.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.started.elapsed().as_secs_f64();
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": (uptime * 100.0).round() / 100.0,
        "total_tools": state.registry.len(),
        "request_count": state.request_count.load(Ordering::Relaxed),
    }))
}

/// GET /tools - always succeeds, possibly with an empty catalog.
async fn list_tools_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let descriptors = describe(&state.registry, &state.schemas);
    let mut tools = serde_json::Map::new();
    let mut schemas = serde_json::Map::new();
    for descriptor in &descriptors {
        tools.insert(descriptor.name.clone(), json!(descriptor.description));
        schemas.insert(
            descriptor.name.clone(),
            json!(descriptor.input_schema.to_string()),
        );
    }

    Json(json!({
        "tools": tools,
        "schemas": schemas,
        "total_count": descriptors.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Wire request for POST /execute. The parameter payload arrives as a
/// serialized JSON object, not inline JSON, so clients can pass payloads
/// through untyped string fields.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub tool_name: String,
    pub parameters: String,
}

/// POST /execute - deserialize, dispatch, and map the outcome:
/// bad payload → 400, unknown tool → 404, adapter failure → 500 with the
/// well-formed envelope as body, success → 200.
async fn execute_handler(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let params: Value = serde_json::from_str(&request.parameters).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("Invalid parameters payload: {}", e)})),
        )
    })?;

    let response = state
        .dispatcher
        .dispatch(&request.tool_name, params)
        .await
        .map_err(|e| match e {
            DispatchError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()})))
            }
            DispatchError::NoCallShape(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            ),
        })?;

    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use toolgate_core::{
        AdapterDeclaration, AdapterError, CallShapes, Capability, ProviderResult, ToolResponse,
    };

    struct GreeterAdapter;

    #[async_trait]
    impl Capability for GreeterAdapter {
        fn description(&self) -> Option<String> {
            Some("greets the caller".into())
        }

        fn shapes(&self) -> CallShapes {
            CallShapes::EXECUTE
        }

        async fn execute(&self, params: Value) -> Result<ProviderResult, AdapterError> {
            let name = params["name"].as_str().unwrap_or("world");
            Ok(ProviderResult::from_value(json!({
                "content": [{"type": "text", "text": format!("hello {}", name)}]
            })))
        }
    }

    struct BrokenAdapter;

    #[async_trait]
    impl Capability for BrokenAdapter {
        fn shapes(&self) -> CallShapes {
            CallShapes::PROCESS
        }

        async fn process(&self, _params: Value) -> Result<ProviderResult, AdapterError> {
            Err(AdapterError::Api("backend unavailable".into()))
        }
    }

    fn test_state() -> AppState {
        let declarations = vec![
            AdapterDeclaration::new("greeter", CallShapes::EITHER, || {
                Ok(Arc::new(GreeterAdapter) as Arc<dyn Capability>)
            }),
            AdapterDeclaration::new("broken", CallShapes::EITHER, || {
                Ok(Arc::new(BrokenAdapter) as Arc<dyn Capability>)
            }),
        ];
        let registry = Arc::new(AdapterRegistry::load_all(&declarations));
        AppState::new(registry, SchemaTable::builtin())
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn execute_request(tool_name: &str, parameters: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/execute")
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({"tool_name": tool_name, "parameters": parameters}).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_registry_size() {
        let app = app_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["total_tools"], 2);
        assert_eq!(body["request_count"], 0);
    }

    #[tokio::test]
    async fn tools_lists_catalog_with_serialized_schemas() {
        let app = app_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["total_count"], 2);
        assert_eq!(body["tools"]["greeter"], "greets the caller");

        // schemas are JSON strings that parse back to schema objects
        let schema: Value =
            serde_json::from_str(body["schemas"]["greeter"].as_str().unwrap()).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[tokio::test]
    async fn execute_returns_envelope_on_success() {
        let app = app_router(test_state());
        let response = app
            .oneshot(execute_request("greeter", r#"{"name": "ada"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let envelope: ToolResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.text, "hello ada");
        assert_eq!(envelope.tool_name, "greeter");
    }

    #[tokio::test]
    async fn malformed_parameters_are_a_client_error() {
        let app = app_router(test_state());
        let response = app
            .oneshot(execute_request("greeter", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Invalid parameters"));
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let app = app_router(test_state());
        let response = app
            .oneshot(execute_request("nonexistent-name", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn adapter_failure_returns_well_formed_envelope_with_500() {
        let app = app_router(test_state());
        let response = app.oneshot(execute_request("broken", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let envelope: ToolResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert!(!envelope.success);
        assert!(envelope.text.contains("backend unavailable"));
        assert_eq!(envelope.tool_name, "broken");
        assert!(!envelope.timestamp.is_empty());
    }

    #[tokio::test]
    async fn request_counter_tracks_tools_and_execute() {
        let state = test_state();
        let app = app_router(state.clone());

        let _ = app
            .clone()
            .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let _ = app
            .clone()
            .oneshot(execute_request("greeter", "{}"))
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["request_count"], 2);
    }
}
