//! Integration tests for generation provider selection and wire formats.

use std::time::Duration;
use wirecode::config::{GenerationSettings, ProviderType};
use wirecode::error::ErrorKind;
use wirecode::prompt::{GenerationConfig, GenerationRequest, Theme};
use wirecode::provider::{gemini_request_body, parse_gemini_response, ModelProvider, ProviderFactory};
use wirecode::{GenerationOrchestrator, RetryPolicy};

fn request(prompt: &str) -> GenerationRequest {
    GenerationRequest {
        prompt: prompt.to_string(),
        theme: Theme::Light,
        config: GenerationConfig::default(),
    }
}

#[test]
fn test_settings_to_gemini_client() {
    let settings = GenerationSettings {
        api_key: Some("test-key".to_string()),
        ..GenerationSettings::default()
    };
    let provider = settings.to_model_provider().unwrap();
    let client = ProviderFactory::create_client(&provider, settings.timeout()).unwrap();
    assert_eq!(client.provider_name(), "gemini");
    assert_eq!(client.model_name(), "gemini-2.0-flash");
}

#[test]
fn test_settings_to_openai_compatible_client() {
    let settings = GenerationSettings {
        provider: ProviderType::OpenAI,
        model: "llama3".to_string(),
        api_key: None,
        api_key_env: None,
        endpoint: Some("http://localhost:11434/v1".to_string()),
        ..GenerationSettings::default()
    };
    let provider = settings.to_model_provider().unwrap();
    assert!(matches!(provider, ModelProvider::OpenAI { api_key: None, .. }));
    let client = ProviderFactory::create_client(&provider, Duration::from_secs(5)).unwrap();
    assert_eq!(client.provider_name(), "openai");
    assert_eq!(client.model_name(), "llama3");
}

#[test]
fn test_gemini_body_uses_default_generation_config() {
    let body = gemini_request_body(&request("build a page"));
    assert_eq!(body["contents"][0]["parts"][0]["text"], "build a page");
    assert_eq!(body["generationConfig"]["topK"], 40);
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    let safety = body["safetySettings"].as_array().unwrap();
    assert_eq!(safety.len(), 4);
    assert!(safety
        .iter()
        .all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
}

#[test]
fn test_gemini_reply_feeds_extractor() {
    let body = serde_json::json!({
        "candidates": [{
            "content": { "parts": [
                { "text": "```html\n<!DOCTYPE html>" },
                { "text": "<html></html>\n```" }
            ]}
        }]
    });
    let text = parse_gemini_response(&body).unwrap();
    let extraction = wirecode::ResponseExtractor::new().extract(&text);
    assert_eq!(extraction.artifacts.markup, "<!DOCTYPE html><html></html>");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_retried_transport_error() {
    let provider = ModelProvider::OpenAI {
        model: "offline".to_string(),
        api_key: None,
        base_url: Some("http://127.0.0.1:9".to_string()),
    };
    let client = ProviderFactory::create_client(&provider, Duration::from_secs(2)).unwrap();
    let policy = RetryPolicy {
        max_attempts: 2,
        delay: Duration::from_millis(1),
        call_timeout: Duration::from_secs(5),
    };

    let result = GenerationOrchestrator::new(client.as_ref(), policy)
        .generate(&request("anything"))
        .await;

    assert!(!result.is_success());
    assert_eq!(result.error_kind, Some(ErrorKind::GenerationTransport));
    assert_eq!(result.transport_failures, 2);
    assert_eq!(result.attempts, 2);
}
