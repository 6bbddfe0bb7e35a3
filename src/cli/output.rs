//! CLI output: error type for command handlers and its mapping to the CLI surface.

use crate::config::ValidationError;
use crate::error::PipelineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {}", join_validation(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Map handler errors to a string for CLI output.
pub fn map_error(e: &CliError) -> String {
    match e {
        CliError::Pipeline(PipelineError::Config(msg)) if msg.contains("API key") => format!(
            "{}\nSet the key in config or export the variable named by api_key_env.",
            e
        ),
        other => other.to_string(),
    }
}
