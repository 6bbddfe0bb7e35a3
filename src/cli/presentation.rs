//! CLI presentation: text and json formatters per command.

use crate::element::{DetectedElements, UIElement};
use crate::extract::{CodeArtifacts, ParseAmbiguityWarning, Segment};
use crate::pipeline::PipelineOutcome;
use crate::prompt::GenerationRequest;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn format_section_heading(title: &str) -> String {
    format!("{}\n{}", title, "-".repeat(title.len()))
}

fn geometry(element: &UIElement) -> (String, String) {
    match (&element.position, &element.bounding_box) {
        (Some(pos), _) => (
            format!("{:.0},{:.0}", pos.x, pos.y),
            format!("{:.0}x{:.0}", element.width, element.height),
        ),
        (None, Some(bbox)) => (
            format!("{:.2},{:.2}", bbox.x, bbox.y),
            format!("{:.2}x{:.2}", bbox.width, bbox.height),
        ),
        (None, None) => ("-".to_string(), "-".to_string()),
    }
}

pub fn format_detected_text(detected: &DetectedElements) -> String {
    let mut out = String::new();
    if let Some(note) = &detected.error {
        out.push_str(note);
        out.push('\n');
        return out;
    }
    out.push_str(&format!("{}\n\n", format_section_heading("Detected elements")));
    if detected.elements.is_empty() {
        out.push_str("No elements detected.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Type", "Text", "Position", "Size"]);
    for element in &detected.elements {
        let (position, size) = geometry(element);
        let label = element.name.clone().unwrap_or_else(|| element.text.clone());
        table.add_row(vec![element.kind.to_string(), label, position, size]);
    }
    out.push_str(&format!("{}\n", table));
    out.push_str(&format!("\nTotal: {} element(s)\n", detected.elements.len()));
    out
}

pub fn format_detected_json(detected: &DetectedElements) -> String {
    to_pretty_json(detected)
}

pub fn format_prompt_text(request: &GenerationRequest) -> String {
    request.prompt.clone()
}

pub fn format_prompt_json(request: &GenerationRequest) -> String {
    to_pretty_json(&serde_json::json!({
        "fingerprint": request.fingerprint(),
        "request": request,
    }))
}

fn push_warnings(out: &mut String, warnings: &[ParseAmbiguityWarning]) {
    if warnings.is_empty() {
        return;
    }
    out.push_str(&format!("{}\n\n", format_section_heading("Warnings")));
    for warning in warnings {
        out.push_str(&format!("  {}\n", warning));
    }
    out.push('\n');
}

pub fn format_artifacts_text(artifacts: &CodeArtifacts, warnings: &[ParseAmbiguityWarning]) -> String {
    let mut out = String::new();
    for segment in [Segment::Markup, Segment::Styles, Segment::Script] {
        let body = artifacts.get(segment);
        if body.is_empty() {
            continue;
        }
        out.push_str(&format!("```{}\n{}\n```\n\n", segment.language(), body));
    }
    if out.is_empty() {
        out.push_str("No code found in response.\n");
    }
    push_warnings(&mut out, warnings);
    out
}

pub fn format_artifacts_json(artifacts: &CodeArtifacts, warnings: &[ParseAmbiguityWarning]) -> String {
    to_pretty_json(&serde_json::json!({
        "html": artifacts.markup,
        "css": artifacts.styles,
        "javascript": artifacts.script,
        "warnings": warnings,
    }))
}

pub fn format_outcome_text(outcome: &PipelineOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Wireframe")));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Status".to_string(), outcome.status.to_string()]);
    table.add_row(vec![
        "Elements".to_string(),
        outcome.detected_elements.elements.len().to_string(),
    ]);
    table.add_row(vec![
        "Page type".to_string(),
        outcome.context.page_type.to_string(),
    ]);
    table.add_row(vec![
        "Sections".to_string(),
        outcome.layout.sections.join(", "),
    ]);
    table.add_row(vec![
        "Attempts".to_string(),
        outcome.result.attempts.to_string(),
    ]);
    out.push_str(&format!("{}\n\n", table));

    if let Some(message) = &outcome.result.message {
        out.push_str(&format!("Message: {}\n\n", message));
    }
    if outcome.result.is_success() {
        out.push_str(&format_artifacts_text(
            &outcome.result.artifacts(),
            &outcome.result.warnings,
        ));
    }
    out
}

pub fn format_outcome_json(outcome: &PipelineOutcome) -> String {
    to_pretty_json(outcome)
}
