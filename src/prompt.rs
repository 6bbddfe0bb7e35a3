//! Generation request construction.
//!
//! The prompt is a pure function of its inputs: same elements, layout, context and
//! theme give a byte-identical prompt, which keeps request fingerprints stable.

use crate::element::{DetectedElements, UIElement, UIElementType};
use crate::layout::LayoutDescriptor;
use crate::page::PageContext;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Starting CSS custom properties for this theme, in emission order.
    pub fn palette(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Theme::Dark => &[
                ("--color-bg", "#121212"),
                ("--color-surface", "#1e1e1e"),
                ("--color-text", "#e0e0e0"),
                ("--color-muted", "#9e9e9e"),
                ("--color-primary", "#90caf9"),
                ("--color-accent", "#f48fb1"),
                ("--color-border", "#333333"),
            ],
            Theme::Light => &[
                ("--color-bg", "#ffffff"),
                ("--color-surface", "#f5f7fa"),
                ("--color-text", "#333333"),
                ("--color-muted", "#6b7280"),
                ("--color-primary", "#3498db"),
                ("--color-accent", "#e74c3c"),
                ("--color-border", "#e5e7eb"),
            ],
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("Unknown theme '{}' (expected 'dark' or 'light')", other)),
        }
    }
}

/// Content-safety threshold for one harm category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// Model sampling and safety configuration sent alongside the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    #[serde(default = "default_safety_settings")]
    pub safety_settings: Vec<SafetySetting>,
}

fn default_temperature() -> f32 {
    0.2
}

fn default_top_p() -> f32 {
    0.95
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
    })
    .collect()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            stop_sequences: Vec::new(),
            safety_settings: default_safety_settings(),
        }
    }
}

/// Everything the generation service needs for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub theme: Theme,
    pub config: GenerationConfig,
}

impl GenerationRequest {
    /// Stable digest of prompt, theme and configuration, usable as a cache key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.prompt.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.theme.as_str().as_bytes());
        hasher.update(&[0]);
        // Struct fields serialize in declaration order, so this is stable.
        let config = serde_json::to_vec(&self.config).unwrap_or_default();
        hasher.update(&config);
        hex::encode(hasher.finalize().as_bytes())
    }
}

/// Prompt sections elements are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementGroup {
    Navigation,
    Buttons,
    InputFields,
    Headings,
    Paragraphs,
    Images,
    Forms,
    Other,
}

impl ElementGroup {
    /// Canonical emission order.
    pub const ALL: [ElementGroup; 8] = [
        ElementGroup::Navigation,
        ElementGroup::Buttons,
        ElementGroup::InputFields,
        ElementGroup::Headings,
        ElementGroup::Paragraphs,
        ElementGroup::Images,
        ElementGroup::Forms,
        ElementGroup::Other,
    ];

    pub fn of(kind: UIElementType) -> Self {
        match kind {
            UIElementType::Navbar | UIElementType::Menu => ElementGroup::Navigation,
            UIElementType::Button => ElementGroup::Buttons,
            UIElementType::InputField => ElementGroup::InputFields,
            UIElementType::Heading => ElementGroup::Headings,
            UIElementType::Paragraph => ElementGroup::Paragraphs,
            UIElementType::Image => ElementGroup::Images,
            UIElementType::Form => ElementGroup::Forms,
            UIElementType::Object | UIElementType::Text | UIElementType::Other => {
                ElementGroup::Other
            }
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ElementGroup::Navigation => "Navigation Elements",
            ElementGroup::Buttons => "Buttons",
            ElementGroup::InputFields => "Input Fields",
            ElementGroup::Headings => "Headings",
            ElementGroup::Paragraphs => "Paragraphs",
            ElementGroup::Images => "Images",
            ElementGroup::Forms => "Forms",
            ElementGroup::Other => "Other Elements",
        }
    }
}

/// Split elements into prompt groups, preserving element order within each group.
pub fn group_elements(elements: &[UIElement]) -> Vec<(ElementGroup, Vec<&UIElement>)> {
    ElementGroup::ALL
        .iter()
        .map(|group| {
            let members = elements
                .iter()
                .filter(|e| ElementGroup::of(e.kind) == *group)
                .collect();
            (*group, members)
        })
        .collect()
}

const CODE_REQUIREMENTS: &[&str] = &[
    "Use semantic HTML5 (header, nav, main, section, footer, etc.)",
    "Create a responsive design with CSS Grid and Flexbox",
    "Add clean, modern styling with consistent spacing",
    "Include proper form validation with JavaScript",
    "Add hover states and transitions for interactive elements",
    "Ensure mobile compatibility with media queries",
    "Use the CSS variables below for consistent theming",
    "Add appropriate accessibility attributes (labels, alt text, ARIA roles)",
    "Use modern ES6+ JavaScript syntax",
    "Match the wireframe layout as closely as possible",
];

/// Builds generation requests from analyzed wireframes.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    config: GenerationConfig,
}

impl PromptBuilder {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn build(
        &self,
        detected: &DetectedElements,
        layout: &LayoutDescriptor,
        context: &PageContext,
        theme: Theme,
    ) -> GenerationRequest {
        GenerationRequest {
            prompt: render_prompt(detected, layout, context, theme),
            theme,
            config: self.config.clone(),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

fn fenced(out: &mut String, title: &str, body: &str) {
    let _ = write!(out, "{}:\n```\n{}\n```\n\n", title, body);
}

/// Render the prompt text in canonical section order.
pub fn render_prompt(
    detected: &DetectedElements,
    layout: &LayoutDescriptor,
    context: &PageContext,
    theme: Theme,
) -> String {
    let mut out = String::new();
    out.push_str(
        "As an expert front-end developer, generate clean, responsive HTML, CSS, and JavaScript \
         code that implements the wireframe described below.\n\n",
    );

    fenced(&mut out, "DETECTED TEXT IN WIREFRAME", detected.full_text.trim());
    fenced(&mut out, "LAYOUT STRUCTURE", &to_json(layout));
    fenced(&mut out, "COLOR SCHEME", &to_json(&context.color_scheme));
    let _ = write!(
        out,
        "PAGE TYPE: this appears to be a {}. Structure the page accordingly.\n\n",
        context.page_type
    );

    out.push_str("DETECTED UI ELEMENTS:\n\n");
    for (group, members) in group_elements(&detected.elements) {
        fenced(&mut out, group.title(), &to_json(&members));
    }

    out.push_str("CODE REQUIREMENTS:\n");
    for (i, requirement) in CODE_REQUIREMENTS.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, requirement);
    }
    out.push('\n');

    let _ = writeln!(out, "THEME: {}. Start the stylesheet from these variables:", theme.as_str());
    out.push_str(":root {\n");
    for (name, value) in theme.palette() {
        let _ = writeln!(out, "  {}: {};", name, value);
    }
    out.push_str("}\n\n");

    out.push_str(
        "OUTPUT FORMAT:\n\
         Return ONLY the three code blocks below, with no explanations outside the blocks:\n\n\
         HTML:\n```html\n(your complete HTML code here)\n```\n\n\
         CSS:\n```css\n(your complete CSS code here)\n```\n\n\
         JavaScript:\n```javascript\n(your complete JavaScript code here)\n```\n",
    );
    out
}
