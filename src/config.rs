//! Configuration System
//!
//! Layered configuration for the wireframe pipeline. Everything, credentials
//! included, is resolved once by the caller through [`ConfigLoader`] and handed to
//! the pipeline as plain values; no stage looks anything up on its own.

use crate::error::PipelineError;
use crate::layout::LayoutConfig;
use crate::logging::LoggingConfig;
use crate::orchestrator::RetryPolicy;
use crate::prompt::GenerationConfig;
use crate::provider::ModelProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WirecodeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub detection: DetectionSettings,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Read an API key: an explicit value wins, otherwise the named environment variable.
fn resolve_key(explicit: &Option<String>, env_name: &Option<String>) -> Option<String> {
    explicit
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| env_name.as_ref().and_then(|name| std::env::var(name).ok()))
        .filter(|k| !k.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSettings {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the key when `api_key` is unset.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Override for the Vision API base URL.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_detection_timeout")]
    pub timeout_secs: u64,
}

fn default_detection_timeout() -> u64 {
    30
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: Some("GOOGLE_VISION_API_KEY".to_string()),
            endpoint: None,
            timeout_secs: default_detection_timeout(),
        }
    }
}

impl DetectionSettings {
    pub fn resolve_api_key(&self) -> Result<String, PipelineError> {
        resolve_key(&self.api_key, &self.api_key_env).ok_or_else(|| {
            PipelineError::Config(format!(
                "Detection API key not set (detection.api_key or ${})",
                self.api_key_env.as_deref().unwrap_or("<unset>")
            ))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Gemini,
    OpenAI,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_provider")]
    pub provider: ProviderType,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Override for the provider base URL.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bound on one generation call.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Sampling and safety options sent with each request.
    #[serde(default)]
    pub options: GenerationConfig,
}

fn default_provider() -> ProviderType {
    ProviderType::Gemini
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_generation_timeout() -> u64 {
    120
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            api_key_env: Some("GOOGLE_GEMINI_API_KEY".to_string()),
            endpoint: None,
            timeout_secs: default_generation_timeout(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            options: GenerationConfig::default(),
        }
    }
}

impl GenerationSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
            call_timeout: self.timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve credentials and produce the provider description.
    pub fn to_model_provider(&self) -> Result<ModelProvider, PipelineError> {
        let api_key = resolve_key(&self.api_key, &self.api_key_env);
        match self.provider {
            ProviderType::Gemini => Ok(ModelProvider::Gemini {
                model: self.model.clone(),
                api_key: api_key.ok_or_else(|| {
                    PipelineError::Config(format!(
                        "Gemini API key not set (generation.api_key or ${})",
                        self.api_key_env.as_deref().unwrap_or("<unset>")
                    ))
                })?,
                base_url: self.endpoint.clone(),
            }),
            ProviderType::OpenAI => Ok(ModelProvider::OpenAI {
                model: self.model.clone(),
                api_key,
                base_url: self.endpoint.clone(),
            }),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Generation(String),
    Detection(String),
    Layout(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Detection(msg) => write!(f, "Detection: {}", msg),
            ValidationError::Layout(msg) => write!(f, "Layout: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl WirecodeConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let generation = &self.generation;

        if generation.model.trim().is_empty() {
            errors.push(ValidationError::Generation("model cannot be empty".to_string()));
        }
        if generation.max_attempts == 0 {
            errors.push(ValidationError::Generation("max_attempts must be at least 1".to_string()));
        }
        if generation.timeout_secs == 0 {
            errors.push(ValidationError::Generation("timeout_secs must be positive".to_string()));
        }
        if !(0.0..=2.0).contains(&generation.options.temperature) {
            errors.push(ValidationError::Generation(format!(
                "temperature {} outside 0.0-2.0",
                generation.options.temperature
            )));
        }
        if !(0.0..=1.0).contains(&generation.options.top_p) {
            errors.push(ValidationError::Generation(format!(
                "top_p {} outside 0.0-1.0",
                generation.options.top_p
            )));
        }
        if let Some(endpoint) = &generation.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                errors.push(ValidationError::Generation(format!("invalid endpoint '{}'", endpoint)));
            }
        }

        if self.detection.timeout_secs == 0 {
            errors.push(ValidationError::Detection("timeout_secs must be positive".to_string()));
        }
        if let Some(endpoint) = &self.detection.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                errors.push(ValidationError::Detection(format!("invalid endpoint '{}'", endpoint)));
            }
        }

        let layout = &self.layout;
        if layout.gap_threshold <= 0.0 {
            errors.push(ValidationError::Layout("gap_threshold must be positive".to_string()));
        }
        if layout.header_limit >= layout.footer_limit {
            errors.push(ValidationError::Layout(format!(
                "header_limit {} must be below footer_limit {}",
                layout.header_limit, layout.footer_limit
            )));
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            errors.push(ValidationError::Logging(format!(
                "invalid format '{}' (must be 'json' or 'text')",
                self.logging.format
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
