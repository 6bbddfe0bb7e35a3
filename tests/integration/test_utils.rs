//! Shared mocks for integration tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use wirecode::detection::{parse_annotate_response, DetectionResponse, DetectionService};
use wirecode::prompt::GenerationRequest;
use wirecode::provider::GenerationClient;
use wirecode::PipelineError;

/// A Vision `images:annotate` reply for a small login wireframe.
pub const LOGIN_WIREFRAME: &str = r#"{
  "responses": [{
    "textAnnotations": [
      { "description": "Home About Contact\nWelcome back\nEmail\nPassword\nLogin" },
      { "description": "Home About Contact", "boundingPoly": { "vertices": [
          {"x": 20, "y": 10}, {"x": 620, "y": 10}, {"x": 620, "y": 40}, {"x": 20, "y": 40}] } },
      { "description": "Welcome back", "boundingPoly": { "vertices": [
          {"x": 200, "y": 250}, {"x": 420, "y": 250}, {"x": 420, "y": 280}, {"x": 200, "y": 280}] } },
      { "description": "Email", "boundingPoly": { "vertices": [
          {"x": 200, "y": 320}, {"x": 420, "y": 320}, {"x": 420, "y": 345}, {"x": 200, "y": 345}] } },
      { "description": "Password", "boundingPoly": { "vertices": [
          {"x": 200, "y": 370}, {"x": 420, "y": 370}, {"x": 420, "y": 395}, {"x": 200, "y": 395}] } },
      { "description": "Login", "boundingPoly": { "vertices": [
          {"x": 260, "y": 430}, {"x": 360, "y": 430}, {"x": 360, "y": 460}, {"x": 260, "y": 460}] } }
    ],
    "localizedObjectAnnotations": []
  }]
}"#;

pub struct CannedDetector {
    pub response: DetectionResponse,
}

impl CannedDetector {
    pub fn login() -> Self {
        Self {
            response: parse_annotate_response(LOGIN_WIREFRAME.as_bytes())
                .expect("fixture must parse"),
        }
    }
}

#[async_trait]
impl DetectionService for CannedDetector {
    async fn detect(&self, _image: &[u8]) -> Result<DetectionResponse, PipelineError> {
        Ok(self.response.clone())
    }
}

/// Replays scripted replies in order and records every prompt it saw.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, PipelineError>>>,
    pub calls: AtomicU32,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, PipelineError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PipelineError::GenerationTransport("script exhausted".to_string())))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

pub const FULL_REPLY: &str = "Here is your page.\n\n```html\n<!DOCTYPE html>\n<html>\n<head><link rel=\"stylesheet\" href=\"styles.css\"></head>\n<body><form><input type=\"email\"><button>Login</button></form></body>\n</html>\n```\n\n```css\nbody { font-family: sans-serif; }\n```\n\n```javascript\ndocument.querySelector('form').addEventListener('submit', (e) => e.preventDefault());\n```\n";
