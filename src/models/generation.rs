use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted prompt/artifact pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: String,
    pub prompt_text: String,
    /// Public path of the generated image, relative to the server root.
    pub image_url: String,
    pub timestamp: DateTime<Utc>,
}

impl GenerationRecord {
    pub fn new(prompt_text: String, image_url: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt_text,
            image_url,
            timestamp: Utc::now(),
        }
    }
}

/// Body of `POST /generate`. A missing prompt field is treated as empty and
/// rejected by validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Successful response of `POST /generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub prompt: String,
    pub image_url: String,
}

/// Generic `{message}` body used by the deletion and shutdown endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
