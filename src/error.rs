//! Error types for the Neuromotion engine

use thiserror::Error;

/// Errors that can occur while configuring or driving the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid exercise plan: {0}")]
    InvalidPlan(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
