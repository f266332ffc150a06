//! REST API server for the loan decision backend
//!
//! Exposes the pipeline via HTTP endpoints and integrates with the demo
//! frontend. Upstream model failures map to 502 with a structured JSON
//! error body; the chat endpoint follows the same contract (no
//! 200-with-error-field responses).

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::chat::ChatResponder;
use crate::error::PipelineError;
use crate::features::LoanRequest;
use crate::models::{ChatReply, ChatRequest};
use crate::orchestrator::DecisionOrchestrator;

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<DecisionOrchestrator>,
    pub responder: Arc<ChatResponder>,
    /// Echoed by /health for quick deployment checks.
    pub rate_model_url: String,
}

/// Structured error body returned for every failed request.
fn error_body(error: &PipelineError) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "error": error_kind(error),
        "detail": error.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

fn error_kind(error: &PipelineError) -> &'static str {
    match error {
        PipelineError::UpstreamTransport { .. } | PipelineError::Http(_) => "upstream_transport",
        PipelineError::UpstreamStatus { .. } => "upstream_status",
        PipelineError::MalformedResponse { .. } => "malformed_upstream_response",
        PipelineError::Credential(_) => "credential",
        PipelineError::Config(_) => "config",
        _ => "internal",
    }
}

fn error_status(error: &PipelineError) -> StatusCode {
    if error.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model_endpoint": state.rate_model_url,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// =============================
/// Predict Endpoint
/// =============================

async fn predict(
    State(state): State<ApiState>,
    Json(request): Json<LoanRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    info!("Received loan prediction request");

    match state.orchestrator.decide(&request).await {
        Ok(outcome) => {
            let body = serde_json::to_value(&outcome)
                .unwrap_or_else(|_| serde_json::json!({}));
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            error!("Loan decision failed: {}", e);
            (error_status(&e), error_body(&e))
        }
    }
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.responder.respond(&request.message).await {
        Ok(response) => {
            let reply = ChatReply { response };
            let body = serde_json::to_value(&reply)
                .unwrap_or_else(|_| serde_json::json!({}));
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            error!("Chat request failed: {}", e);
            (error_status(&e), error_body(&e))
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/chat", post(chat))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockApprovalModel, MockCompletionModel, MockRateModel};
    use crate::context::DecisionContextStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state(confidence: f64) -> ApiState {
        let context = DecisionContextStore::new();
        ApiState {
            orchestrator: Arc::new(DecisionOrchestrator::new(
                Arc::new(MockApprovalModel {
                    confidence,
                    threshold: 0.75,
                }),
                Arc::new(MockRateModel { rate: 6.13 }),
                context.clone(),
            )),
            responder: Arc::new(ChatResponder::new(
                Arc::new(MockCompletionModel),
                context,
            )),
            rate_model_url: "https://rate.example/v2/models/interest-rate/infer".to_string(),
        }
    }

    async fn json_response(
        router: Router,
        request: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_the_rate_endpoint() {
        let router = create_router(test_state(0.8));
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = json_response(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(
            body["model_endpoint"],
            "https://rate.example/v2/models/interest-rate/infer"
        );
    }

    #[tokio::test]
    async fn predict_returns_the_decision_shape() {
        let router = create_router(test_state(0.8));
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"avg_credit_score": 720, "avg_annual_income": 95000}"#,
            ))
            .unwrap();

        let (status, body) = json_response(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loan_approved"], true);
        assert_eq!(body["approval_confidence"], 0.8);
        assert_eq!(body["predicted_interest_rate"], 6.13);
        assert!(body["approval_model_output"].is_object());
    }

    #[tokio::test]
    async fn declined_predict_has_null_rate() {
        let router = create_router(test_state(0.5));
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let (status, body) = json_response(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loan_approved"], false);
        assert!(body["predicted_interest_rate"].is_null());
    }

    #[tokio::test]
    async fn chat_returns_a_response_field() {
        let router = create_router(test_state(0.8));
        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message": "Why was I denied?"}"#))
            .unwrap();

        let (status, body) = json_response(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].is_string());
    }

    #[tokio::test]
    async fn predict_then_chat_shares_context() {
        let state = test_state(0.8);
        let router = create_router(state.clone());

        let before = state
            .responder
            .respond("How do I lower my rate?")
            .await
            .unwrap();

        let predict_req = Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"avg_credit_score": 720}"#))
            .unwrap();
        let (status, _) = json_response(router, predict_req).await;
        assert_eq!(status, StatusCode::OK);

        // Mock completion echoes prompt length; grounding the prompt in the
        // stored decision changes it, so the replies must differ.
        let after = state
            .responder
            .respond("How do I lower my rate?")
            .await
            .unwrap();
        assert_ne!(before, after);
    }
}
