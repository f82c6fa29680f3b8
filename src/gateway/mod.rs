//! Task-bounded execution between HTTP requests and the inference pipeline.

mod executor;

pub use executor::InferenceGateway;
