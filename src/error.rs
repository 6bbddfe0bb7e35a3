//! Error types for the wireframe-to-code pipeline.

use thiserror::Error;

/// Pipeline failures, one variant per failure kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Upstream detection call failed. Non-fatal: callers get an empty element list.
    #[error("Detection failed: {0}")]
    Detection(String),

    /// Network or model failure while generating. Retried.
    #[error("Generation transport error: {0}")]
    GenerationTransport(String),

    /// The model answered but no usable markup could be extracted. Retried.
    #[error("Generated markup is empty: {0}")]
    EmptyOutputValidation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Detection(_) => ErrorKind::Detection,
            PipelineError::GenerationTransport(_) => ErrorKind::GenerationTransport,
            PipelineError::EmptyOutputValidation(_) => ErrorKind::EmptyOutputValidation,
            PipelineError::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the orchestrator may spend another attempt on this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::GenerationTransport(_) | PipelineError::EmptyOutputValidation(_)
        )
    }
}

/// Serializable tag for [`PipelineError`], carried in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Detection,
    GenerationTransport,
    EmptyOutputValidation,
    Config,
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
