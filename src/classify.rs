//! Element classification: maps a detection's text and geometry to a UI role.

use crate::element::{LocalizedObject, NormalizedBox, Position, RawDetection, UIElement, UIElementType};

const NAVIGATION_KEYWORDS: &[&str] = &["nav", "menu", "home", "about", "contact"];
const ACTION_KEYWORDS: &[&str] = &["submit", "send", "login", "sign", "create", "delete", "update"];
const FIELD_KEYWORDS: &[&str] = &["name", "email", "password", "username", "address"];

/// Text shorter than this (and short in height) reads as a heading;
/// longer text reads as a paragraph. Exactly this length is neither.
const HEADING_TEXT_LIMIT: usize = 50;
const HEADING_HEIGHT_LIMIT: f64 = 40.0;
/// Navigation wider than this multiple of its height is a horizontal bar.
const NAVBAR_ASPECT: f64 = 3.0;

/// Classify a text detection. Pure and total: first matching rule wins.
pub fn classify(text: &str, width: f64, height: f64) -> UIElementType {
    let lower = text.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if contains_any(NAVIGATION_KEYWORDS) {
        if width > height * NAVBAR_ASPECT {
            return UIElementType::Navbar;
        }
        return UIElementType::Menu;
    }

    if contains_any(ACTION_KEYWORDS) {
        return UIElementType::Button;
    }

    if contains_any(FIELD_KEYWORDS) {
        return UIElementType::InputField;
    }

    let length = text.chars().count();
    if length < HEADING_TEXT_LIMIT && height < HEADING_HEIGHT_LIMIT {
        return UIElementType::Heading;
    }

    if length > HEADING_TEXT_LIMIT {
        return UIElementType::Paragraph;
    }

    UIElementType::Text
}

/// Build a classified element from an OCR text block.
///
/// Size is taken from the polygon's outer edges; position is the first vertex.
/// Degenerate polygons (fewer than 4 vertices) yield a zero-sized element.
pub fn element_from_detection(detection: &RawDetection) -> UIElement {
    let v = &detection.vertices;
    let (position, width, height) = if v.len() >= 4 {
        let width = v[1].x.max(v[2].x) - v[0].x.min(v[3].x);
        let height = v[2].y.max(v[3].y) - v[0].y.min(v[1].y);
        (Position { x: v[0].x, y: v[0].y }, width, height)
    } else {
        let origin = v.first().map(|p| Position { x: p.x, y: p.y }).unwrap_or_default();
        (origin, 0.0, 0.0)
    };

    UIElement {
        kind: classify(&detection.text, width, height),
        text: detection.text.clone(),
        position: Some(position),
        width,
        height,
        confidence: detection.confidence,
        ..UIElement::default()
    }
}

/// Build an `object` element from a localized object. Objects skip `classify`.
pub fn element_from_object(object: &LocalizedObject) -> UIElement {
    let v = &object.normalized_vertices;
    let bounding_box = match v.len() {
        n if n >= 3 => NormalizedBox {
            x: v[0].x,
            y: v[0].y,
            width: v[1].x - v[0].x,
            height: v[2].y - v[0].y,
        },
        1 | 2 => NormalizedBox {
            x: v[0].x,
            y: v[0].y,
            ..NormalizedBox::default()
        },
        _ => NormalizedBox::default(),
    };

    UIElement {
        kind: UIElementType::Object,
        name: Some(object.name.clone()),
        confidence: Some(object.confidence),
        bounding_box: Some(bounding_box),
        ..UIElement::default()
    }
}
