//! CLI parse: clap types for wirecode. No behavior; definitions only.

use crate::prompt::Theme;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// wirecode - turn wireframe images into HTML, CSS and JavaScript
#[derive(Parser)]
#[command(name = "wirecode")]
#[command(about = "Generate front-end code from UI wireframe images")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/config.toml is read from here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run text and object detection on a wireframe image
    Detect {
        /// Wireframe image (PNG or JPEG)
        image: PathBuf,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Build the generation prompt from a detected-elements JSON file
    Prompt {
        /// JSON produced by `wirecode detect --format json`
        elements: PathBuf,
        #[arg(long, default_value = "light")]
        theme: Theme,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Split a saved model reply into markup, styles and script
    Extract {
        /// Raw model reply text file
        response: PathBuf,
        /// Pretty-print markup and styles
        #[arg(long)]
        beautify: bool,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Detect, build the prompt, generate and extract in one run
    Generate {
        /// Wireframe image (PNG or JPEG)
        #[arg(required_unless_present = "elements", conflicts_with = "elements")]
        image: Option<PathBuf>,
        /// Skip detection and use a saved detected-elements JSON file
        #[arg(long)]
        elements: Option<PathBuf>,
        #[arg(long, default_value = "light")]
        theme: Theme,
        /// Write index.html, styles.css and script.js into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Pretty-print markup and styles
        #[arg(long)]
        beautify: bool,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}
