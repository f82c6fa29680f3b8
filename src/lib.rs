pub mod artifacts;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod store;
pub mod test_util;

pub use artifacts::ArtifactStore;
pub use config::Config;
pub use error::Error;
pub use gateway::InferenceGateway;
pub use models::generation::{GenerateRequest, GenerateResponse, GenerationRecord};
pub use store::PromptStore;

use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub gateway: Arc<InferenceGateway>,
    pub store: Arc<PromptStore>,
    pub artifacts: Arc<ArtifactStore>,
}
