use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::Result;
use crate::models::generation::{GenerateRequest, GenerateResponse};
use crate::AppState;

/// POST /generate - run the prompt through the pipeline and persist the result.
async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let record = match state.gateway.submit(&request.prompt).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Generation failed: {}", e);
            return Err(e);
        }
    };

    Ok(Json(GenerateResponse {
        prompt: record.prompt_text,
        image_url: record.image_url,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .with_state(state)
}
