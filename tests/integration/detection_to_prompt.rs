//! Integration tests for detection output flowing through classification,
//! layout and page inference into the generation prompt.

use super::test_utils::LOGIN_WIREFRAME;
use wirecode::detection::{elements_from_response, parse_annotate_response};
use wirecode::layout::{LayoutAnalyzer, LayoutConfig};
use wirecode::page::{ColorScheme, PageContext, PageType};
use wirecode::prompt::{GenerationConfig, PromptBuilder, Theme};
use wirecode::{DetectedElements, UIElementType};

fn login_elements() -> DetectedElements {
    let response = parse_annotate_response(LOGIN_WIREFRAME.as_bytes()).unwrap();
    elements_from_response(&response)
}

#[test]
fn test_login_wireframe_classification() {
    let detected = login_elements();
    let kinds: Vec<UIElementType> = detected.elements.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            UIElementType::Navbar,
            UIElementType::Heading,
            UIElementType::InputField,
            UIElementType::InputField,
            UIElementType::Button,
        ]
    );
    assert_eq!(detected.count_of(UIElementType::InputField), 2);
    assert_eq!(detected.elements[0].width, 600.0);
    assert_eq!(detected.elements[0].height, 30.0);
}

#[test]
fn test_login_wireframe_layout_and_context() {
    let detected = login_elements();
    let layout = LayoutAnalyzer::new(LayoutConfig::default()).analyze(&detected.elements);
    assert!(layout.has_header);
    assert!(!layout.has_footer);
    assert_eq!(layout.sections, vec!["header".to_string(), "section_1".to_string()]);

    let context = PageContext::infer(&detected.full_text, &detected.elements);
    assert_eq!(context.page_type, PageType::Login);
    assert!(matches!(context.color_scheme, ColorScheme::Default { .. }));
}

#[test]
fn test_prompt_contains_every_stage_output() {
    let detected = login_elements();
    let layout = LayoutAnalyzer::default().analyze(&detected.elements);
    let context = PageContext::infer(&detected.full_text, &detected.elements);
    let request = PromptBuilder::new(GenerationConfig::default()).build(
        &detected,
        &layout,
        &context,
        Theme::Dark,
    );

    let prompt = &request.prompt;
    assert!(prompt.contains("Welcome back"));
    assert!(prompt.contains("\"has_header\": true"));
    assert!(prompt.contains("login page"));
    assert!(prompt.contains("Navigation Elements"));
    assert!(prompt.contains("THEME: dark"));

    let text_at = prompt.find("DETECTED TEXT IN WIREFRAME").unwrap();
    let layout_at = prompt.find("LAYOUT STRUCTURE").unwrap();
    let output_at = prompt.find("OUTPUT FORMAT").unwrap();
    assert!(text_at < layout_at && layout_at < output_at);
    assert_eq!(request.theme, Theme::Dark);
}

#[test]
fn test_failed_detection_still_builds_prompt() {
    let detected = DetectedElements::failed("Detection failed: timeout");
    let layout = LayoutAnalyzer::default().analyze(&detected.elements);
    let context = PageContext::infer(&detected.full_text, &detected.elements);
    assert_eq!(context.page_type, PageType::GeneralLanding);
    let request = PromptBuilder::default().build(&detected, &layout, &context, Theme::Light);
    assert!(request.prompt.contains("general landing page"));
}
