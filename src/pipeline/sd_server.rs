//! Diffusion sidecar pipeline implementation.
//!
//! Talks to an external HTTP server that owns the pretrained model. The
//! sidecar picks its own execution device and returns finished PNG bytes.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{DiffusionPipeline, PipelineProvider};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};

/// Client for a running diffusion sidecar.
#[derive(Debug)]
pub struct SdServerPipeline {
    http_client: Client,
    base_url: String,
    width: u32,
    height: u32,
    steps: u32,
}

impl SdServerPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            width: config.width,
            height: config.height,
            steps: config.steps,
        }
    }
}

#[derive(Debug, Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
    steps: u32,
}

#[async_trait]
impl DiffusionPipeline for SdServerPipeline {
    fn pipeline_type(&self) -> &'static str {
        "sd-server"
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let url = format!("{}/txt2img", self.base_url);

        tracing::debug!("Sending txt2img request to {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&Txt2ImgRequest {
                prompt,
                width: self.width,
                height: self.height,
                steps: self.steps,
            })
            .send()
            .await
            .map_err(|e| Error::Inference(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("{}: {}", status, body)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Inference(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// Provider that probes the sidecar before handing out a pipeline handle.
pub struct SdServerProvider {
    http_client: Client,
    config: PipelineConfig,
}

impl SdServerProvider {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            http_client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PipelineProvider for SdServerProvider {
    async fn load(&self) -> Result<Arc<dyn DiffusionPipeline>> {
        let url = format!("{}/health", self.config.base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::PipelineUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::PipelineUnavailable(format!(
                "sidecar returned {}",
                response.status()
            )));
        }

        tracing::info!("Connected to diffusion sidecar at {}", self.config.base_url);

        Ok(Arc::new(SdServerPipeline::new(&self.config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let config = PipelineConfig {
            base_url: "http://localhost:7860/".to_string(),
            ..PipelineConfig::default()
        };
        let pipeline = SdServerPipeline::new(&config);
        assert_eq!(pipeline.base_url, "http://localhost:7860");
    }

    #[test]
    fn test_txt2img_request_serializes() {
        let request = Txt2ImgRequest {
            prompt: "a red bicycle",
            width: 512,
            height: 512,
            steps: 30,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("a red bicycle"));
        assert!(json.contains(r#""steps":30"#));
    }
}
