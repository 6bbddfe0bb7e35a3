//! Merge rules: built-in defaults that every later source overrides.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("generation.provider", "gemini")?
        .set_default("generation.model", "gemini-2.0-flash")?
        .set_default("generation.api_key_env", "GOOGLE_GEMINI_API_KEY")?
        .set_default("detection.api_key_env", "GOOGLE_VISION_API_KEY")
}
