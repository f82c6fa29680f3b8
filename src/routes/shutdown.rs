use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::models::generation::MessageResponse;
use crate::AppState;

/// POST /shutdown - release the inference pipeline.
///
/// The service keeps serving; the next generation reloads the pipeline
/// lazily.
async fn shutdown(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let message = if state.gateway.release().await {
        "Inference pipeline released"
    } else {
        "Inference pipeline was not loaded"
    };

    Json(MessageResponse {
        message: message.to_string(),
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/shutdown", post(shutdown))
        .with_state(state)
}
