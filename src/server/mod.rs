//! HTTP surface: one evaluation endpoint plus a health probe.
//!
//! The handler state is generic over [`ScoringModel`] so the whole router
//! can be exercised in tests with a canned scorer; production wires in
//! [`crate::scorer::LlmScorer`] resolved once at startup (the provider is
//! the only credential-bearing resource and lives for the process
//! lifetime — there is no per-request mutable state anywhere).
//!
//! Status mapping: 200 on success, 400 for missing/invalid required
//! fields, 405 for any non-POST method on the evaluation route (axum's
//! method router), 500 for configuration or model-call failures.

pub mod error;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::GraderConfig;
use crate::grade;
use crate::payload::EvaluationRequest;
use crate::score::EvaluationResult;
use crate::scorer::ScoringModel;
use error::ApiError;

/// Shared per-process state: the scorer and the grading config.
pub struct AppState<S: ScoringModel> {
    pub scorer: Arc<S>,
    pub config: Arc<GraderConfig>,
}

// Manual impl: `S` itself need not be `Clone` behind the `Arc`s.
impl<S: ScoringModel> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            scorer: Arc::clone(&self.scorer),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: ScoringModel> AppState<S> {
    pub fn new(scorer: S, config: GraderConfig) -> Self {
        Self {
            scorer: Arc::new(scorer),
            config: Arc::new(config),
        }
    }
}

/// Build the application router over the given state.
pub fn create_router<S>(state: AppState<S>) -> Router
where
    S: ScoringModel + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/v1/evaluations", post(evaluate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `POST /v1/evaluations` — grade one submission.
async fn evaluate_handler<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResult>, ApiError>
where
    S: ScoringModel + 'static,
{
    info!(
        texts = request.texts.len(),
        images = request.images.len(),
        max_marks = request.max_marks,
        "Evaluation request received"
    );

    let result = grade::evaluate(state.scorer.as_ref(), &request, &state.config).await?;
    Ok(Json(result))
}
