//! Integration tests for layered configuration feeding the pipeline.

use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use wirecode::config::{ConfigLoader, ProviderType};
use wirecode::WireframePipeline;

// Environment variables are process-wide.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn write_workspace_config(root: &std::path::Path, body: &str) {
    let dir = root.join("config");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), body).unwrap();
}

#[test]
fn test_workspace_config_sets_retry_and_layout() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(
        temp_dir.path(),
        r#"
[generation]
max_attempts = 5
retry_delay_ms = 250
timeout_secs = 30

[layout]
gap_threshold = 40.0
header_limit = 150.0
"#,
    );

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert!(config.validate().is_ok());

    let policy = config.generation.retry_policy();
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.delay, Duration::from_millis(250));
    assert_eq!(policy.call_timeout, Duration::from_secs(30));
    assert_eq!(config.layout.gap_threshold, 40.0);
    assert_eq!(config.layout.footer_limit, 800.0);
}

#[test]
fn test_missing_workspace_config_uses_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert_eq!(config.generation.provider, ProviderType::Gemini);
    assert_eq!(config.generation.options.temperature, 0.2);
    assert_eq!(config.detection.api_key_env.as_deref(), Some("GOOGLE_VISION_API_KEY"));
}

#[test]
fn test_env_override_reaches_pipeline_settings() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(temp_dir.path(), "[generation]\nprovider = \"gemini\"\n");

    std::env::set_var("WIRECODE__GENERATION__PROVIDER", "openai");
    std::env::set_var("WIRECODE__GENERATION__MODEL", "local-coder");
    let loaded = ConfigLoader::load(temp_dir.path());
    std::env::remove_var("WIRECODE__GENERATION__PROVIDER");
    std::env::remove_var("WIRECODE__GENERATION__MODEL");

    let config = loaded.unwrap();
    assert_eq!(config.generation.provider, ProviderType::OpenAI);
    assert_eq!(config.generation.model, "local-coder");
}

#[test]
fn test_invalid_file_is_reported() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[generation\nmodel = ").unwrap();
    assert!(ConfigLoader::load_from_file(&path).is_err());

    let missing = temp_dir.path().join("missing.toml");
    assert!(ConfigLoader::load_from_file(&missing).is_err());
}

#[test]
fn test_validation_rejects_inverted_layout_limits() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(
        temp_dir.path(),
        "[layout]\nheader_limit = 900.0\nfooter_limit = 100.0\n",
    );
    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().starts_with("Layout:"));
}

#[tokio::test]
async fn test_pipeline_from_loaded_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        write_workspace_config(temp_dir.path(), "[generation]\nmax_attempts = 1\n");
        ConfigLoader::load(temp_dir.path()).unwrap()
    };

    let client = super::test_utils::ScriptedClient::new(vec![Ok("no code".to_string())]);
    let outcome = WireframePipeline::from_config(&client, &config)
        .generate(wirecode::DetectedElements::default(), wirecode::Theme::Light)
        .await;
    assert_eq!(client.call_count(), 1);
    assert_eq!(outcome.result.empty_output_failures, 1);
}
