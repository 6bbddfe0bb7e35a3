//! One wireframe, end to end.
//!
//! [`WireframePipeline`] runs the stages in order: detection, layout and page
//! context, prompt, orchestrated generation, then optional formatting. It never
//! touches storage; callers get a [`PipelineOutcome`] holding the JSON payloads
//! to persist and the [`WireframeStatus`] to record.

use crate::config::WirecodeConfig;
use crate::detection::{detect_wireframe_elements, DetectionService};
use crate::element::DetectedElements;
use crate::error::PipelineError;
use crate::formatter::CodeFormatter;
use crate::layout::{LayoutAnalyzer, LayoutConfig, LayoutDescriptor};
use crate::orchestrator::{GenerationOrchestrator, GenerationResult, RetryPolicy};
use crate::page::PageContext;
use crate::prompt::{GenerationConfig, GenerationRequest, PromptBuilder, Theme};
use crate::provider::GenerationClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of a stored wireframe record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireframeStatus {
    #[default]
    #[serde(alias = "pending")]
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl WireframeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireframeStatus::Uploaded => "uploaded",
            WireframeStatus::Processing => "processing",
            WireframeStatus::Completed => "completed",
            WireframeStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WireframeStatus::Completed | WireframeStatus::Failed)
    }

    /// Forward-only: uploaded → processing → completed | failed.
    pub fn can_transition_to(&self, next: WireframeStatus) -> bool {
        matches!(
            (self, next),
            (WireframeStatus::Uploaded, WireframeStatus::Processing)
                | (WireframeStatus::Processing, WireframeStatus::Completed)
                | (WireframeStatus::Processing, WireframeStatus::Failed)
        )
    }
}

impl fmt::Display for WireframeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted `generated_code` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub html: String,
    pub css: String,
    pub javascript: String,
    pub theme: Theme,
    pub provider: String,
    pub model: String,
    pub attempts: u32,
    pub generated_at: DateTime<Utc>,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub status: WireframeStatus,
    pub detected_elements: DetectedElements,
    pub layout: LayoutDescriptor,
    pub context: PageContext,
    /// Present only when generation succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_code: Option<GeneratedCode>,
    pub result: GenerationResult,
}

impl PipelineOutcome {
    pub fn detected_elements_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.detected_elements).unwrap_or(serde_json::Value::Null)
    }

    pub fn generated_code_json(&self) -> Option<serde_json::Value> {
        self.generated_code
            .as_ref()
            .and_then(|code| serde_json::to_value(code).ok())
    }
}

/// Stage wiring for a single wireframe. Holds no per-run state.
pub struct WireframePipeline<'a> {
    client: &'a dyn GenerationClient,
    formatter: Option<&'a dyn CodeFormatter>,
    layout: LayoutAnalyzer,
    prompts: PromptBuilder,
    policy: RetryPolicy,
}

impl<'a> WireframePipeline<'a> {
    pub fn new(
        client: &'a dyn GenerationClient,
        layout: LayoutConfig,
        generation: GenerationConfig,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            formatter: None,
            layout: LayoutAnalyzer::new(layout),
            prompts: PromptBuilder::new(generation),
            policy,
        }
    }

    pub fn from_config(client: &'a dyn GenerationClient, config: &WirecodeConfig) -> Self {
        Self::new(
            client,
            config.layout,
            config.generation.options.clone(),
            config.generation.retry_policy(),
        )
    }

    pub fn with_formatter(mut self, formatter: &'a dyn CodeFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Layout, page context and the generation request for already detected elements.
    pub fn prepare(
        &self,
        detected: &DetectedElements,
        theme: Theme,
    ) -> (LayoutDescriptor, PageContext, GenerationRequest) {
        let layout = self.layout.analyze(&detected.elements);
        let context = PageContext::infer(&detected.full_text, &detected.elements);
        let request = self.prompts.build(detected, &layout, &context, theme);
        debug!(
            page_type = %context.page_type,
            sections = layout.sections.len(),
            fingerprint = %request.fingerprint(),
            "Generation request prepared"
        );
        (layout, context, request)
    }

    /// Generate code for already detected elements.
    pub async fn generate(&self, detected: DetectedElements, theme: Theme) -> PipelineOutcome {
        let (layout, context, request) = self.prepare(&detected, theme);

        if let Some(note) = &detected.error {
            warn!(error = %note, "Skipping generation, detection produced no elements");
            let mut result = GenerationResult::failure(&PipelineError::Detection(String::new()));
            result.message = Some(note.clone());
            return PipelineOutcome {
                status: WireframeStatus::Failed,
                detected_elements: detected,
                layout,
                context,
                generated_code: None,
                result,
            };
        }

        let orchestrator = GenerationOrchestrator::new(self.client, self.policy);
        let mut result = orchestrator.generate(&request).await;

        if result.is_success() {
            if let Some(formatter) = self.formatter {
                let pretty = formatter.beautify(&result.artifacts());
                result.markup = pretty.markup;
                result.styles = pretty.styles;
                result.script = pretty.script;
            }
        }

        let (status, generated_code) = if result.is_success() {
            let code = GeneratedCode {
                html: result.markup.clone(),
                css: result.styles.clone(),
                javascript: result.script.clone(),
                theme,
                provider: self.client.provider_name().to_string(),
                model: self.client.model_name().to_string(),
                attempts: result.attempts,
                generated_at: Utc::now(),
            };
            (WireframeStatus::Completed, Some(code))
        } else {
            (WireframeStatus::Failed, None)
        };

        info!(
            status = %status,
            attempts = result.attempts,
            elements = detected.elements.len(),
            "Wireframe pipeline finished"
        );

        PipelineOutcome {
            status,
            detected_elements: detected,
            layout,
            context,
            generated_code,
            result,
        }
    }

    /// Detect, then generate.
    pub async fn run(
        &self,
        detector: &dyn DetectionService,
        image: &[u8],
        detection_timeout: Duration,
        theme: Theme,
    ) -> PipelineOutcome {
        let detected = detect_wireframe_elements(detector, image, detection_timeout).await;
        self.generate(detected, theme).await
    }
}
