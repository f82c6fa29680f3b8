//! Diffusion gateway - accepts text prompts, runs them through a pretrained
//! text-to-image pipeline under bounded concurrency, and serves the history
//! of past generations.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use diffusion_gateway::pipeline::SdServerProvider;
use diffusion_gateway::{routes, AppState, ArtifactStore, Config, InferenceGateway, PromptStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting diffusion-gateway");

    // Initialize components
    let artifacts = Arc::new(ArtifactStore::new(&config.storage.root)?);
    let store = Arc::new(PromptStore::new(&config.database.url)?);
    let provider = Arc::new(SdServerProvider::new(config.pipeline.clone()));
    let gateway = Arc::new(InferenceGateway::new(
        &config.generation,
        provider,
        store.clone(),
        artifacts.clone(),
    ));

    let state = Arc::new(AppState {
        config: config.clone(),
        gateway,
        store,
        artifacts,
    });

    let app = routes::router(state);

    // Start server
    let addr = format!("{}:{}", config.api.host, config.api.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
