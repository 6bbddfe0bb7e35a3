//! Generation orchestration: bounded retries around the external generation call.
//!
//! An attempt succeeds only when the call returns in time and the reply yields
//! non-empty markup. Transport failures and empty output share one retry budget
//! but are counted separately. Dropping the returned future cancels any pending
//! retry; no further calls are made after that.

use crate::error::{ErrorKind, PipelineError};
use crate::extract::{CodeArtifacts, ParseAmbiguityWarning, ResponseExtractor};
use crate::prompt::GenerationRequest;
use crate::provider::GenerationClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

/// Retry budget and per-call bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fixed wait between attempts.
    pub delay: Duration,
    /// Upper bound on a single generation call.
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
            call_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Success,
    Error,
}

/// Terminal value of one generation run. Code fields are never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub status: GenerationStatus,
    pub markup: String,
    pub styles: String,
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default)]
    pub warnings: Vec<ParseAmbiguityWarning>,
    pub attempts: u32,
    pub transport_failures: u32,
    pub empty_output_failures: u32,
}

impl GenerationResult {
    pub fn success(artifacts: CodeArtifacts, warnings: Vec<ParseAmbiguityWarning>) -> Self {
        Self {
            status: GenerationStatus::Success,
            markup: artifacts.markup,
            styles: artifacts.styles,
            script: artifacts.script,
            message: None,
            error_kind: None,
            warnings,
            attempts: 0,
            transport_failures: 0,
            empty_output_failures: 0,
        }
    }

    pub fn failure(err: &PipelineError) -> Self {
        Self {
            status: GenerationStatus::Error,
            markup: String::new(),
            styles: String::new(),
            script: String::new(),
            message: Some(err.to_string()),
            error_kind: Some(err.kind()),
            warnings: Vec::new(),
            attempts: 0,
            transport_failures: 0,
            empty_output_failures: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == GenerationStatus::Success
    }

    pub fn artifacts(&self) -> CodeArtifacts {
        CodeArtifacts {
            markup: self.markup.clone(),
            styles: self.styles.clone(),
            script: self.script.clone(),
        }
    }
}

/// Stateless driver for generation attempts.
pub struct GenerationOrchestrator<'a> {
    client: &'a dyn GenerationClient,
    extractor: ResponseExtractor,
    policy: RetryPolicy,
}

impl<'a> GenerationOrchestrator<'a> {
    pub fn new(client: &'a dyn GenerationClient, policy: RetryPolicy) -> Self {
        Self {
            client,
            extractor: ResponseExtractor::default(),
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<(CodeArtifacts, Vec<ParseAmbiguityWarning>), PipelineError> {
        let raw = match tokio::time::timeout(self.policy.call_timeout, self.client.generate(request)).await {
            Ok(reply) => reply?,
            Err(_) => {
                return Err(PipelineError::GenerationTransport(format!(
                    "generation call timed out after {:?}",
                    self.policy.call_timeout
                )))
            }
        };

        let extraction = self.extractor.extract(&raw);
        if extraction.artifacts.markup.trim().is_empty() {
            return Err(PipelineError::EmptyOutputValidation(format!(
                "no markup found in {} byte reply",
                raw.len()
            )));
        }
        Ok((extraction.artifacts, extraction.warnings))
    }

    /// Run attempts until one succeeds or the budget is spent.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut transport_failures = 0;
        let mut empty_output_failures = 0;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self.attempt(request).await {
                Ok((artifacts, warnings)) => {
                    info!(
                        attempt,
                        provider = self.client.provider_name(),
                        model = self.client.model_name(),
                        markup_bytes = artifacts.markup.len(),
                        "Generation succeeded"
                    );
                    let mut result = GenerationResult::success(artifacts, warnings);
                    result.attempts = attempt;
                    result.transport_failures = transport_failures;
                    result.empty_output_failures = empty_output_failures;
                    return result;
                }
                Err(err) => {
                    match err {
                        PipelineError::EmptyOutputValidation(_) => empty_output_failures += 1,
                        _ => transport_failures += 1,
                    }
                    warn!(
                        attempt,
                        max_attempts,
                        kind = ?err.kind(),
                        error = %err,
                        "Generation attempt failed"
                    );
                    let retry = err.is_retryable() && attempt < max_attempts;
                    last_error = Some(err);
                    if !retry {
                        break;
                    }
                    tokio::time::sleep(self.policy.delay).await;
                }
            }
        }

        let err = last_error.unwrap_or_else(|| {
            PipelineError::GenerationTransport("generation failed without an attempt".to_string())
        });
        error!(
            attempts = transport_failures + empty_output_failures,
            transport_failures,
            empty_output_failures,
            error = %err,
            "Generation failed permanently"
        );
        let mut result = GenerationResult::failure(&err);
        result.attempts = transport_failures + empty_output_failures;
        result.transport_failures = transport_failures;
        result.empty_output_failures = empty_output_failures;
        result
    }
}
