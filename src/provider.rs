//! Generation service clients.
//!
//! The pipeline only needs "prompt + configuration in, raw text out", expressed by
//! [`GenerationClient`]. Two HTTP backends are provided: Google Gemini and any
//! OpenAI-compatible chat completions endpoint.

use crate::error::PipelineError;
use crate::prompt::GenerationRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Generation backend selection, with credentials already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelProvider {
    Gemini {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    OpenAI {
        model: String,
        api_key: Option<String>,
        base_url: Option<String>, // Any OpenAI-compatible endpoint
    },
}

/// Generation service client.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Run one generation call and return the raw reply text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, PipelineError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

fn map_http_error(error: reqwest::Error) -> PipelineError {
    if let Some(status) = error.status() {
        PipelineError::GenerationTransport(format!("Request failed with status {}: {}", status, error))
    } else if error.is_timeout() {
        PipelineError::GenerationTransport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        PipelineError::GenerationTransport(format!("Connection error: {}", error))
    } else {
        PipelineError::GenerationTransport(format!("HTTP error: {}", error))
    }
}

fn map_status(status: reqwest::StatusCode, body: &str) -> PipelineError {
    let message = match status.as_u16() {
        401 | 403 => format!("Authentication failed: {}", body),
        404 => format!("Model not found: {}", body),
        429 => format!("Rate limit exceeded: {}", body),
        _ => format!("Request failed with status {}: {}", status, body),
    };
    PipelineError::GenerationTransport(message)
}

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_http_client(request_timeout: Duration) -> Result<Client, PipelineError> {
    Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()
        .map_err(|e| PipelineError::Config(format!("Failed to create HTTP client: {}", e)))
}

async fn read_json(response: reqwest::Response) -> Result<Value, PipelineError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(map_status(status, &body));
    }
    response
        .json()
        .await
        .map_err(|e| PipelineError::GenerationTransport(format!("Failed to parse response: {}", e)))
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        model: String,
        api_key: String,
        base_url: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            client: build_http_client(request_timeout)?,
            model,
            api_key,
            base_url: base_url.unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
        })
    }
}

/// Request body for `models/{model}:generateContent`.
pub fn gemini_request_body(request: &GenerationRequest) -> Value {
    let config = &request.config;
    let safety: Vec<Value> = config
        .safety_settings
        .iter()
        .map(|s| json!({ "category": s.category, "threshold": s.threshold }))
        .collect();
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        "generationConfig": {
            "temperature": config.temperature,
            "topP": config.top_p,
            "topK": config.top_k,
            "maxOutputTokens": config.max_output_tokens,
            "stopSequences": config.stop_sequences,
        },
        "safetySettings": safety,
    })
}

/// Concatenated text parts of the first candidate.
pub fn parse_gemini_response(body: &Value) -> Result<String, PipelineError> {
    let candidate = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .ok_or_else(|| {
            let reason = body
                .pointer("/promptFeedback/blockReason")
                .and_then(Value::as_str)
                .unwrap_or("no candidates in response");
            PipelineError::GenerationTransport(format!("Gemini returned no candidate: {}", reason))
        })?;

    let parts = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    Ok(parts)
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, PipelineError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&gemini_request_body(request))
            .send()
            .await
            .map_err(map_http_error)?;
        let body = read_json(response).await?;
        parse_gemini_response(&body)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAICompatibleClient {
    client: Client,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAICompatibleClient {
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            client: build_http_client(request_timeout)?,
            model,
            api_key,
            base_url: base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerationClient for OpenAICompatibleClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, PipelineError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.config.temperature,
            top_p: request.config.top_p,
            max_tokens: request.config.max_output_tokens,
            stop: Some(request.config.stop_sequences.as_slice()).filter(|s| !s.is_empty()),
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }
        let response = builder.send().await.map_err(map_http_error)?;
        let value = read_json(response).await?;
        let completion: ChatCompletionResponse = serde_json::from_value(value).map_err(|e| {
            PipelineError::GenerationTransport(format!("Failed to parse response: {}", e))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::GenerationTransport("No choices in response".to_string()))?;
        Ok(choice.message.content.unwrap_or_default())
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(
        provider: &ModelProvider,
        request_timeout: Duration,
    ) -> Result<Box<dyn GenerationClient>, PipelineError> {
        match provider {
            ModelProvider::Gemini {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(GeminiClient::new(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
                request_timeout,
            )?)),
            ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(OpenAICompatibleClient::new(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
                request_timeout,
            )?)),
        }
    }
}
