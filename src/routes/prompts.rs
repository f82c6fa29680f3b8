use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::error::{Error, Result};
use crate::models::generation::{GenerationRecord, MessageResponse};
use crate::AppState;

/// GET /view-prompts - all saved generations, newest first.
async fn view_prompts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GenerationRecord>>> {
    let records = state.store.list()?;
    Ok(Json(records))
}

/// DELETE /delete-prompt/:id - remove one generation and its image.
///
/// The image file goes first; the record only goes once the file is out of
/// the way, so a failed file deletion leaves the pair intact.
async fn delete_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let record = state
        .store
        .get(&id)?
        .ok_or_else(|| Error::NotFound(id.clone()))?;

    if let Err(e) = state.artifacts.delete(&record.image_url) {
        tracing::error!("Failed to delete artifact for prompt {}: {}", id, e);
        return Err(e);
    }

    if !state.store.delete(&id)? {
        return Err(Error::NotFound(id));
    }

    tracing::info!("Deleted prompt {}", id);
    Ok(Json(MessageResponse {
        message: "Prompt and image deleted successfully".to_string(),
    }))
}

/// DELETE /delete-all-prompts - remove every generation and image.
async fn delete_all_prompts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>> {
    let records = state.store.list()?;
    for record in &records {
        if let Err(e) = state.artifacts.delete(&record.image_url) {
            tracing::error!(
                "Failed to delete artifact for prompt {}: {}",
                record.id,
                e
            );
            return Err(e);
        }
    }

    let deleted = state.store.delete_all()?;

    tracing::info!("Deleted {} prompts", deleted);
    Ok(Json(MessageResponse {
        message: format!("Deleted {} prompts and their images", deleted),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/view-prompts", get(view_prompts))
        .route("/delete-prompt/:id", delete(delete_prompt))
        .route("/delete-all-prompts", delete(delete_all_prompts))
        .with_state(state)
}
