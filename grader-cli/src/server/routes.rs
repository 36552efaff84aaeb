//! Review and health endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use grader_core::{CompletedReview, ReviewPayload, ReviewRequest};
use serde_json::{json, Value};

use super::{ApiError, AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/review", post(review))
        .route("/health", get(health))
        .with_state(state)
}

pub(crate) async fn review(
    State(state): State<AppState>,
    payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> Result<Json<CompletedReview>, ApiError> {
    let Json(payload) = payload?;
    let request = ReviewRequest::try_from(payload)?;

    tracing::info!(
        repository = %request.repository(),
        level = %request.candidate_level(),
        "Review requested"
    );

    let review = state.service.process(&request).await?;
    Ok(Json(review))
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
