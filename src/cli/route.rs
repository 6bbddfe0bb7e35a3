//! CLI route: single route table and run context. Dispatches to pipeline stages and presentation.

use crate::cli::output::CliError;
use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{
    format_artifacts_json, format_artifacts_text, format_detected_json, format_detected_text,
    format_outcome_json, format_outcome_text, format_prompt_json, format_prompt_text,
};
use crate::config::{ConfigLoader, WirecodeConfig};
use crate::detection::{detect_wireframe_elements, VisionClient};
use crate::element::DetectedElements;
use crate::extract::{CodeArtifacts, ResponseExtractor};
use crate::formatter::{CodeFormatter, IndentFormatter};
use crate::layout::LayoutAnalyzer;
use crate::page::PageContext;
use crate::pipeline::{PipelineOutcome, WireframePipeline};
use crate::prompt::{PromptBuilder, Theme};
use crate::provider::ProviderFactory;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Runtime context for CLI execution: the resolved configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    config: WirecodeConfig,
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_elements(path: &Path) -> Result<DetectedElements, CliError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write non-empty artifacts as index.html, styles.css and script.js.
pub fn write_artifacts(dir: &Path, artifacts: &CodeArtifacts) -> Result<Vec<PathBuf>, CliError> {
    std::fs::create_dir_all(dir).map_err(|source| CliError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let files = [
        ("index.html", &artifacts.markup),
        ("styles.css", &artifacts.styles),
        ("script.js", &artifacts.script),
    ];
    let mut written = Vec::new();
    for (name, body) in files {
        if body.is_empty() {
            continue;
        }
        let path = dir.join(name);
        std::fs::write(&path, body).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    Ok(written)
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(&workspace_root),
        }
        .map_err(crate::error::PipelineError::from)?;
        Self::from_config(config)
    }

    pub fn from_config(config: WirecodeConfig) -> Result<Self, CliError> {
        config.validate().map_err(CliError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WirecodeConfig {
        &self.config
    }

    /// Execute a command and return the text to print.
    pub async fn execute(&self, command: &Commands) -> Result<String, CliError> {
        let started = Instant::now();
        let output = match command {
            Commands::Detect { image, format } => self.handle_detect(image, *format).await,
            Commands::Prompt {
                elements,
                theme,
                format,
            } => self.handle_prompt(elements, *theme, *format),
            Commands::Extract {
                response,
                beautify,
                format,
            } => self.handle_extract(response, *beautify, *format),
            Commands::Generate {
                image,
                elements,
                theme,
                out_dir,
                beautify,
                format,
            } => {
                self.handle_generate(
                    image.as_deref(),
                    elements.as_deref(),
                    *theme,
                    out_dir.as_deref(),
                    *beautify,
                    *format,
                )
                .await
            }
        };
        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            ok = output.is_ok(),
            "Command finished"
        );
        output
    }

    async fn detect(&self, image: &Path) -> Result<DetectedElements, CliError> {
        let settings = &self.config.detection;
        let bytes = read_bytes(image)?;
        let client = VisionClient::new(
            settings.resolve_api_key()?,
            settings.endpoint.clone(),
            settings.timeout(),
        )?;
        Ok(detect_wireframe_elements(&client, &bytes, settings.timeout()).await)
    }

    async fn handle_detect(&self, image: &Path, format: OutputFormat) -> Result<String, CliError> {
        let detected = self.detect(image).await?;
        Ok(match format {
            OutputFormat::Text => format_detected_text(&detected),
            OutputFormat::Json => format_detected_json(&detected),
        })
    }

    fn handle_prompt(
        &self,
        elements: &Path,
        theme: Theme,
        format: OutputFormat,
    ) -> Result<String, CliError> {
        let detected = read_elements(elements)?;
        let layout = LayoutAnalyzer::new(self.config.layout).analyze(&detected.elements);
        let context = PageContext::infer(&detected.full_text, &detected.elements);
        let request = PromptBuilder::new(self.config.generation.options.clone())
            .build(&detected, &layout, &context, theme);
        Ok(match format {
            OutputFormat::Text => format_prompt_text(&request),
            OutputFormat::Json => format_prompt_json(&request),
        })
    }

    fn handle_extract(
        &self,
        response: &Path,
        beautify: bool,
        format: OutputFormat,
    ) -> Result<String, CliError> {
        let raw = read_text(response)?;
        let extraction = ResponseExtractor::new().extract(&raw);
        let artifacts = if beautify {
            IndentFormatter::default().beautify(&extraction.artifacts)
        } else {
            extraction.artifacts
        };
        Ok(match format {
            OutputFormat::Text => format_artifacts_text(&artifacts, &extraction.warnings),
            OutputFormat::Json => format_artifacts_json(&artifacts, &extraction.warnings),
        })
    }

    async fn handle_generate(
        &self,
        image: Option<&Path>,
        elements: Option<&Path>,
        theme: Theme,
        out_dir: Option<&Path>,
        beautify: bool,
        format: OutputFormat,
    ) -> Result<String, CliError> {
        let generation = &self.config.generation;
        let provider = generation.to_model_provider()?;
        let client = ProviderFactory::create_client(&provider, generation.timeout())?;

        let detected = match (elements, image) {
            (Some(path), _) => read_elements(path)?,
            (None, Some(path)) => self.detect(path).await?,
            (None, None) => DetectedElements::default(),
        };

        let formatter = IndentFormatter::default();
        let mut pipeline = WireframePipeline::from_config(client.as_ref(), &self.config);
        if beautify {
            pipeline = pipeline.with_formatter(&formatter);
        }
        let outcome: PipelineOutcome = pipeline.generate(detected, theme).await;

        if !outcome.result.is_success() {
            return Err(CliError::GenerationFailed(
                outcome.result.message.clone().unwrap_or_default(),
            ));
        }

        let mut rendered = match format {
            OutputFormat::Text => format_outcome_text(&outcome),
            OutputFormat::Json => format_outcome_json(&outcome),
        };
        if let Some(dir) = out_dir {
            let written = write_artifacts(dir, &outcome.result.artifacts())?;
            if format == OutputFormat::Text {
                for path in written {
                    rendered.push_str(&format!("Wrote {}\n", path.display()));
                }
            }
        }
        Ok(rendered)
    }
}
