use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex, Semaphore};
use tokio::time::timeout;

use crate::artifacts::ArtifactStore;
use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::models::generation::GenerationRecord;
use crate::pipeline::{DiffusionPipeline, PipelineProvider};
use crate::store::PromptStore;

/// Bounded executor between HTTP requests and the shared inference pipeline.
///
/// Submissions are admitted FIFO into a fixed number of worker slots; the
/// caller waits on a completion channel under a deadline that also covers
/// queueing time. A deadline that fires cancels the caller's wait only: the
/// worker keeps its slot until the pipeline call returns, then frees it, so
/// a slow generation can never wedge the pool.
///
/// The pipeline handle is loaded lazily through the provider on first use and
/// cached for the process lifetime until `release` drops it.
pub struct InferenceGateway {
    provider: Arc<dyn PipelineProvider>,
    pipeline: Mutex<Option<Arc<dyn DiffusionPipeline>>>,
    slots: Arc<Semaphore>,
    invoke_lock: Option<Arc<Mutex<()>>>,
    request_timeout: Duration,
    store: Arc<PromptStore>,
    artifacts: Arc<ArtifactStore>,
}

impl InferenceGateway {
    pub fn new(
        config: &GenerationConfig,
        provider: Arc<dyn PipelineProvider>,
        store: Arc<PromptStore>,
        artifacts: Arc<ArtifactStore>,
    ) -> Self {
        Self {
            provider,
            pipeline: Mutex::new(None),
            slots: Arc::new(Semaphore::new(config.workers)),
            invoke_lock: config
                .serialize_invocations
                .then(|| Arc::new(Mutex::new(()))),
            request_timeout: Duration::from_secs(config.timeout_secs),
            store,
            artifacts,
        }
    }

    /// Validate the prompt and execute it against the pipeline within the
    /// configured worker and deadline bounds.
    pub async fn submit(&self, prompt: &str) -> Result<GenerationRecord> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::EmptyPrompt);
        }

        let (tx, rx) = oneshot::channel();

        let admitted = async {
            let permit = self
                .slots
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| Error::Inference("worker pool closed".to_string()))?;

            let task = GenerationTask {
                pipeline: self.pipeline().await?,
                invoke_lock: self.invoke_lock.clone(),
                store: self.store.clone(),
                artifacts: self.artifacts.clone(),
                prompt: prompt.to_string(),
            };

            tokio::spawn(async move {
                let outcome = task.run().await;
                drop(permit);
                if let Err(unclaimed) = tx.send(outcome) {
                    // The caller timed out; the record (if any) stays committed.
                    match unclaimed {
                        Ok(record) => tracing::warn!(
                            "Generation {} finished after the caller gave up",
                            record.id
                        ),
                        Err(e) => tracing::warn!(
                            "Generation failed after the caller gave up: {}",
                            e
                        ),
                    }
                }
            });

            match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::Inference("generation task dropped".to_string())),
            }
        };

        match timeout(self.request_timeout, admitted).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout(self.request_timeout.as_secs())),
        }
    }

    /// The cached pipeline, loading it through the provider on first use.
    async fn pipeline(&self) -> Result<Arc<dyn DiffusionPipeline>> {
        let mut slot = self.pipeline.lock().await;
        if let Some(pipeline) = slot.as_ref() {
            return Ok(pipeline.clone());
        }

        let pipeline = self.provider.load().await?;
        tracing::info!("Loaded {} pipeline", pipeline.pipeline_type());
        *slot = Some(pipeline.clone());
        Ok(pipeline)
    }

    /// Drop the cached pipeline handle. Returns whether one was loaded.
    /// The next submission reloads lazily.
    pub async fn release(&self) -> bool {
        let mut slot = self.pipeline.lock().await;
        let was_loaded = slot.take().is_some();
        if was_loaded {
            tracing::info!("Released inference pipeline");
        }
        was_loaded
    }
}

/// One admitted generation, run to completion on its own task.
struct GenerationTask {
    pipeline: Arc<dyn DiffusionPipeline>,
    invoke_lock: Option<Arc<Mutex<()>>>,
    store: Arc<PromptStore>,
    artifacts: Arc<ArtifactStore>,
    prompt: String,
}

impl GenerationTask {
    async fn run(self) -> Result<GenerationRecord> {
        let bytes = match &self.invoke_lock {
            Some(lock) => {
                let _guard = lock.lock().await;
                self.pipeline.generate(&self.prompt).await?
            }
            None => self.pipeline.generate(&self.prompt).await?,
        };

        // Artifact lands on disk before the record commits, so a committed
        // record never references a missing file. A crash in between leaves
        // an orphaned file, not a dangling record.
        let image_url = self.artifacts.save(&bytes)?;
        let record = GenerationRecord::new(self.prompt, image_url);
        self.store.insert(&record)?;

        Ok(record)
    }
}
