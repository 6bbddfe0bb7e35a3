//! CLI domain: parse, route, output, and presentation only.
//! No pipeline logic here; a single route table dispatches to the pipeline stages.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{map_error, CliError};
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{
    format_artifacts_json, format_artifacts_text, format_detected_json, format_detected_text,
    format_outcome_json, format_outcome_text, format_prompt_json, format_prompt_text,
};
pub use route::{write_artifacts, RunContext};
