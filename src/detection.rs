//! Detection service boundary.
//!
//! Text and object detection run outside this crate; this module calls the service,
//! decodes its response and turns it into classified [`DetectedElements`].

use crate::classify::{element_from_detection, element_from_object};
use crate::element::{DetectedElements, LocalizedObject, RawDetection, Vertex};
use crate::error::PipelineError;
use crate::provider::build_http_client;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

const VISION_BASE_URL: &str = "https://vision.googleapis.com/v1";

/// What the detection service returns for one image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionResponse {
    /// Aggregate text of the whole image.
    pub full_text: String,
    /// Individual text blocks, in service order.
    pub detections: Vec<RawDetection>,
    pub objects: Vec<LocalizedObject>,
}

#[async_trait]
pub trait DetectionService: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<DetectionResponse, PipelineError>;
}

/// Classify every text block and append localized objects as `object` elements.
pub fn elements_from_response(response: &DetectionResponse) -> DetectedElements {
    let elements = response
        .detections
        .iter()
        .map(element_from_detection)
        .chain(response.objects.iter().map(element_from_object))
        .collect();
    DetectedElements {
        elements,
        full_text: response.full_text.clone(),
        error: None,
    }
}

/// Run detection under `timeout`. Failures are non-fatal: they produce an empty
/// element list with an error note.
pub async fn detect_wireframe_elements(
    service: &dyn DetectionService,
    image: &[u8],
    timeout: Duration,
) -> DetectedElements {
    let outcome = match tokio::time::timeout(timeout, service.detect(image)).await {
        Ok(result) => result,
        Err(_) => Err(PipelineError::Detection(format!(
            "detection timed out after {:?}",
            timeout
        ))),
    };

    match outcome {
        Ok(response) => {
            let detected = elements_from_response(&response);
            info!(
                elements = detected.elements.len(),
                objects = response.objects.len(),
                "Wireframe detection completed"
            );
            detected
        }
        Err(err) => {
            warn!(error = %err, "Wireframe detection failed");
            DetectedElements::failed(err.to_string())
        }
    }
}

/// Google Cloud Vision `images:annotate` client (text detection + object localization).
pub struct VisionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl VisionClient {
    pub fn new(api_key: String, base_url: Option<String>, request_timeout: Duration) -> Result<Self, PipelineError> {
        Ok(Self {
            client: build_http_client(request_timeout)?,
            api_key,
            base_url: base_url.unwrap_or_else(|| VISION_BASE_URL.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageAnnotation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageAnnotation {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<ObjectAnnotation>,
    error: Option<AnnotationError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    bounding_poly: Polygon,
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectAnnotation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    bounding_poly: Polygon,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Polygon {
    #[serde(default)]
    vertices: Vec<Vertex>,
    #[serde(default)]
    normalized_vertices: Vec<Vertex>,
}

#[derive(Debug, Deserialize)]
struct AnnotationError {
    #[serde(default)]
    message: String,
}

/// Decode an `images:annotate` response body.
///
/// The first text annotation is the whole-image text; the rest are individual blocks.
pub fn parse_annotate_response(body: &[u8]) -> Result<DetectionResponse, PipelineError> {
    let parsed: AnnotateResponse = serde_json::from_slice(body)
        .map_err(|e| PipelineError::Detection(format!("Failed to parse detection response: {}", e)))?;
    let annotation = parsed.responses.into_iter().next().unwrap_or_default();
    if let Some(error) = annotation.error {
        return Err(PipelineError::Detection(error.message));
    }

    let mut texts = annotation.text_annotations.into_iter();
    let full_text = texts.next().map(|t| t.description).unwrap_or_default();
    let detections = texts
        .map(|t| RawDetection {
            text: t.description,
            vertices: t.bounding_poly.vertices,
            confidence: t.score,
        })
        .collect();
    let objects = annotation
        .localized_object_annotations
        .into_iter()
        .map(|o| LocalizedObject {
            name: o.name,
            confidence: o.score,
            normalized_vertices: o.bounding_poly.normalized_vertices,
        })
        .collect();

    Ok(DetectionResponse {
        full_text,
        detections,
        objects,
    })
}

#[async_trait]
impl DetectionService for VisionClient {
    async fn detect(&self, image: &[u8]) -> Result<DetectionResponse, PipelineError> {
        let body = json!({
            "requests": [{
                "image": { "content": BASE64.encode(image) },
                "features": [
                    { "type": "TEXT_DETECTION" },
                    { "type": "OBJECT_LOCALIZATION" }
                ]
            }]
        });

        let url = format!("{}/images:annotate", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Detection(format!("Detection request failed: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Detection(format!("Failed to read detection response: {}", e)))?;
        if !status.is_success() {
            return Err(PipelineError::Detection(format!(
                "Detection request failed with status {}: {}",
                status,
                String::from_utf8_lossy(&bytes)
            )));
        }
        parse_annotate_response(&bytes)
    }
}
