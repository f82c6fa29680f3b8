//! Inference pipeline abstraction layer.
//!
//! This module defines the `DiffusionPipeline` trait that hides the actual
//! text-to-image backend behind a common interface, and the
//! `PipelineProvider` trait that produces a loaded pipeline handle on demand.

mod sd_server;

pub use sd_server::{SdServerPipeline, SdServerProvider};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// A loaded text-to-image model, treated as an opaque callable.
///
/// Implementations may or may not tolerate concurrent invocation; the gateway
/// serializes calls when configured to (see `GenerationConfig`).
#[async_trait]
pub trait DiffusionPipeline: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this pipeline type (e.g., "sd-server").
    fn pipeline_type(&self) -> &'static str;

    /// Render the prompt to PNG bytes.
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>>;
}

/// Produces a loaded pipeline.
///
/// Called lazily on first use and again after a shutdown released the cached
/// handle. A failed load surfaces as `Error::PipelineUnavailable`.
#[async_trait]
pub trait PipelineProvider: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn DiffusionPipeline>>;
}
