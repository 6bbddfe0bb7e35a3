//! wirecode: Wireframe-to-Code Generation
//!
//! Turns OCR and object-detection output from a UI wireframe into typed elements,
//! infers layout and page purpose, builds a generation prompt, and parses the
//! model reply into separate markup, styles and script.

pub mod classify;
pub mod cli;
pub mod config;
pub mod detection;
pub mod element;
pub mod error;
pub mod extract;
pub mod formatter;
pub mod layout;
pub mod logging;
pub mod orchestrator;
pub mod page;
pub mod pipeline;
pub mod prompt;
pub mod provider;

pub use element::{DetectedElements, UIElement, UIElementType};
pub use error::PipelineError;
pub use extract::{CodeArtifacts, ResponseExtractor};
pub use orchestrator::{GenerationOrchestrator, GenerationResult, RetryPolicy};
pub use pipeline::{WireframePipeline, WireframeStatus};
pub use prompt::{GenerationRequest, PromptBuilder, Theme};
