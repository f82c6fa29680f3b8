//! Shared test support: deterministic stand-ins for the diffusion sidecar
//! and helpers for wiring up an `AppState` against temporary storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gateway::InferenceGateway;
use crate::pipeline::{DiffusionPipeline, PipelineProvider};
use crate::store::PromptStore;
use crate::AppState;

/// Minimal valid PNG signature, good enough for artifact round-trips.
pub const PNG_STUB: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// In-memory pipeline with controllable latency and failure, plus counters
/// for observing invocation concurrency.
#[derive(Debug)]
pub struct StubPipeline {
    delay: StdMutex<Duration>,
    fail_with: Option<String>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    invocations: AtomicUsize,
}

impl StubPipeline {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: StdMutex::new(delay),
            fail_with: None,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Highest number of overlapping `generate` calls observed.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl Default for StubPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiffusionPipeline for StubPipeline {
    fn pipeline_type(&self) -> &'static str {
        "stub"
    }

    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        self.invocations.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        match &self.fail_with {
            Some(message) => Err(Error::Inference(message.clone())),
            None => Ok(PNG_STUB.to_vec()),
        }
    }
}

/// Provider handing out a fixed stub pipeline, or refusing to load at all.
pub struct StubProvider {
    pipeline: Option<Arc<StubPipeline>>,
    loads: AtomicUsize,
}

impl StubProvider {
    pub fn new(pipeline: Arc<StubPipeline>) -> Self {
        Self {
            pipeline: Some(pipeline),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            pipeline: None,
            loads: AtomicUsize::new(0),
        }
    }

    /// How many times `load` has handed out a pipeline.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PipelineProvider for StubProvider {
    async fn load(&self) -> Result<Arc<dyn DiffusionPipeline>> {
        match &self.pipeline {
            Some(pipeline) => {
                self.loads.fetch_add(1, Ordering::SeqCst);
                let pipeline: Arc<dyn DiffusionPipeline> = pipeline.clone();
                Ok(pipeline)
            }
            None => Err(Error::PipelineUnavailable(
                "stub provider offline".to_string(),
            )),
        }
    }
}

/// A config pointing at temporary storage owned by the test.
pub fn test_config(artifact_root: &std::path::Path, database_url: &str) -> Config {
    let mut config = Config::default();
    config.storage.root = artifact_root.display().to_string();
    config.database.url = database_url.to_string();
    config
}

/// Build the full application state around the given provider.
pub fn create_test_state(
    config: Config,
    provider: Arc<dyn PipelineProvider>,
) -> Arc<AppState> {
    let artifacts = Arc::new(ArtifactStore::new(&config.storage.root).unwrap());
    let store = Arc::new(PromptStore::new(&config.database.url).unwrap());
    let gateway = Arc::new(InferenceGateway::new(
        &config.generation,
        provider,
        store.clone(),
        artifacts.clone(),
    ));

    Arc::new(AppState {
        config,
        gateway,
        store,
        artifacts,
    })
}
