//! Integration tests for the full wireframe pipeline with mock services.

use super::test_utils::{CannedDetector, ScriptedClient, FULL_REPLY};
use std::time::Duration;
use wirecode::config::WirecodeConfig;
use wirecode::error::ErrorKind;
use wirecode::formatter::IndentFormatter;
use wirecode::layout::LayoutConfig;
use wirecode::orchestrator::GenerationStatus;
use wirecode::prompt::{GenerationConfig, Theme};
use wirecode::{PipelineError, RetryPolicy, WireframePipeline, WireframeStatus};

fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        delay: Duration::from_millis(5),
        call_timeout: Duration::from_secs(5),
    }
}

fn transport(msg: &str) -> Result<String, PipelineError> {
    Err(PipelineError::GenerationTransport(msg.to_string()))
}

#[tokio::test]
async fn test_login_wireframe_end_to_end() {
    let client = ScriptedClient::new(vec![Ok(FULL_REPLY.to_string())]);
    let pipeline = WireframePipeline::new(
        &client,
        LayoutConfig::default(),
        GenerationConfig::default(),
        quick_policy(3),
    );

    let outcome = pipeline
        .run(&CannedDetector::login(), b"image", Duration::from_secs(1), Theme::Light)
        .await;

    assert_eq!(outcome.status, WireframeStatus::Completed);
    assert_eq!(outcome.result.status, GenerationStatus::Success);
    assert_eq!(outcome.result.attempts, 1);
    assert!(outcome.result.markup.starts_with("<!DOCTYPE html>"));
    assert_eq!(outcome.result.styles, "body { font-family: sans-serif; }");
    assert!(outcome.result.script.contains("addEventListener"));
    assert!(outcome.result.warnings.is_empty());

    let prompts = client.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("login page"));
}

#[tokio::test]
async fn test_two_transport_failures_then_success() {
    let client = ScriptedClient::new(vec![
        transport("connection reset"),
        transport("503"),
        Ok(FULL_REPLY.to_string()),
    ]);
    let pipeline = WireframePipeline::new(
        &client,
        LayoutConfig::default(),
        GenerationConfig::default(),
        quick_policy(3),
    );

    let outcome = pipeline
        .run(&CannedDetector::login(), b"image", Duration::from_secs(1), Theme::Light)
        .await;

    assert_eq!(outcome.status, WireframeStatus::Completed);
    assert_eq!(outcome.result.attempts, 3);
    assert_eq!(outcome.result.transport_failures, 2);
    assert_eq!(client.call_count(), 3);
}

#[tokio::test]
async fn test_exhausted_retries_fail_with_last_error() {
    let client = ScriptedClient::new(vec![
        transport("first"),
        Ok("Sorry, I cannot help with that.".to_string()),
        transport("last"),
        Ok(FULL_REPLY.to_string()),
    ]);
    let pipeline = WireframePipeline::new(
        &client,
        LayoutConfig::default(),
        GenerationConfig::default(),
        quick_policy(3),
    );

    let outcome = pipeline
        .run(&CannedDetector::login(), b"image", Duration::from_secs(1), Theme::Light)
        .await;

    assert_eq!(outcome.status, WireframeStatus::Failed);
    assert_eq!(client.call_count(), 3);
    assert_eq!(outcome.result.transport_failures, 2);
    assert_eq!(outcome.result.empty_output_failures, 1);
    assert_eq!(
        outcome.result.message.as_deref(),
        Some("Generation transport error: last")
    );
    assert_eq!(outcome.result.error_kind, Some(ErrorKind::GenerationTransport));
    assert!(outcome.generated_code.is_none());
    assert!(outcome.result.markup.is_empty());
    assert!(outcome.result.styles.is_empty());
    assert!(outcome.result.script.is_empty());
}

#[tokio::test]
async fn test_persisted_payload_shapes() {
    let client = ScriptedClient::new(vec![Ok(FULL_REPLY.to_string())]);
    let formatter = IndentFormatter::default();
    let pipeline = WireframePipeline::from_config(&client, &WirecodeConfig::default())
        .with_formatter(&formatter);

    let outcome = pipeline
        .run(&CannedDetector::login(), b"image", Duration::from_secs(1), Theme::Dark)
        .await;

    let elements = outcome.detected_elements_json();
    assert_eq!(elements["elements"][0]["type"], "navbar");
    assert_eq!(elements["elements"][4]["type"], "button");
    assert!(elements.get("error").is_none());

    let code = outcome.generated_code_json().unwrap();
    assert_eq!(code["theme"], "dark");
    assert_eq!(code["model"], "scripted-model");
    assert_eq!(code["attempts"], 1);
    assert!(code["html"].as_str().unwrap().contains("\n  <head>"));
    assert_eq!(code["css"], "body {\n  font-family: sans-serif;\n}");
}

#[tokio::test]
async fn test_dropping_run_stops_retries() {
    let client = ScriptedClient::new(vec![transport("down"), transport("down"), transport("down")]);
    let policy = RetryPolicy {
        max_attempts: 3,
        delay: Duration::from_secs(60),
        call_timeout: Duration::from_secs(5),
    };
    let pipeline = WireframePipeline::new(
        &client,
        LayoutConfig::default(),
        GenerationConfig::default(),
        policy,
    );

    let detector = CannedDetector::login();
    let run = pipeline.run(&detector, b"image", Duration::from_secs(1), Theme::Light);
    let cancelled = tokio::time::timeout(Duration::from_millis(100), run).await;

    assert!(cancelled.is_err());
    assert_eq!(client.call_count(), 1);
}
