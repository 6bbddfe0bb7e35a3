//! Detection and UI element data model.
//!
//! `RawDetection` and `LocalizedObject` are what the detection service hands back;
//! `UIElement` is the classified, immutable form the rest of the pipeline consumes.

use serde::{Deserialize, Serialize};

/// A polygon vertex in pixel space (or 0..1 space for normalized polygons).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One OCR text block: text plus its 4-vertex bounding polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub text: String,
    /// Ordered top-left, top-right, bottom-right, bottom-left.
    pub vertices: Vec<Vertex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// A localized object with a normalized bounding polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedObject {
    pub name: String,
    pub confidence: f32,
    pub normalized_vertices: Vec<Vertex>,
}

/// Semantic role of a UI element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UIElementType {
    Navbar,
    Menu,
    Button,
    InputField,
    Heading,
    Paragraph,
    Image,
    Form,
    Object,
    #[default]
    Text,
    /// Any type name this crate does not know about.
    #[serde(other)]
    Other,
}

impl UIElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UIElementType::Navbar => "navbar",
            UIElementType::Menu => "menu",
            UIElementType::Button => "button",
            UIElementType::InputField => "input_field",
            UIElementType::Heading => "heading",
            UIElementType::Paragraph => "paragraph",
            UIElementType::Image => "image",
            UIElementType::Form => "form",
            UIElementType::Object => "object",
            UIElementType::Text => "text",
            UIElementType::Other => "other",
        }
    }
}

impl std::fmt::Display for UIElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Bounding box in 0..1 image space, used by localized objects.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A classified UI element.
///
/// Text detections carry a pixel `position`/`width`/`height`; object detections carry
/// `name`, `confidence` and `bounding_box` instead and leave `position` unset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UIElement {
    #[serde(rename = "type", default)]
    pub kind: UIElementType,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<NormalizedBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl UIElement {
    pub fn text_element(kind: UIElementType, text: &str, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            kind,
            text: text.to_string(),
            position: Some(Position { x, y }),
            width,
            height,
            ..Self::default()
        }
    }

    /// True for elements whose name or type marks them as a picture.
    pub fn is_image(&self) -> bool {
        match self.kind {
            UIElementType::Image => true,
            UIElementType::Object => self.name.as_deref().is_some_and(|name| {
                let name = name.to_lowercase();
                ["image", "picture", "photo", "icon"]
                    .iter()
                    .any(|k| name.contains(k))
            }),
            _ => false,
        }
    }
}

/// The element list handed to the rest of the pipeline and persisted as `detected_elements`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectedElements {
    #[serde(default)]
    pub elements: Vec<UIElement>,
    #[serde(default)]
    pub full_text: String,
    /// Set when detection failed; `elements` is empty in that case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectedElements {
    pub fn failed(note: impl Into<String>) -> Self {
        Self {
            elements: Vec::new(),
            full_text: String::new(),
            error: Some(note.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn count_of(&self, kind: UIElementType) -> usize {
        self.elements.iter().filter(|e| e.kind == kind).count()
    }
}
