//! Response extraction: splits a model's free-form reply into markup, styles and script.
//!
//! Each segment has an ordered list of independent strategies; the first one that
//! yields non-empty content wins, otherwise the segment is the empty string.
//! Extracted content is only trimmed of surrounding whitespace.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Markup,
    Styles,
    Script,
}

impl Segment {
    pub fn language(&self) -> &'static str {
        match self {
            Segment::Markup => "html",
            Segment::Styles => "css",
            Segment::Script => "javascript",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.language())
    }
}

/// The three code artifacts. Absent segments are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeArtifacts {
    pub markup: String,
    pub styles: String,
    pub script: String,
}

impl CodeArtifacts {
    pub fn get(&self, segment: Segment) -> &str {
        match segment {
            Segment::Markup => &self.markup,
            Segment::Styles => &self.styles,
            Segment::Script => &self.script,
        }
    }
}

/// A segment was extracted but does not look like its language. Logged, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseAmbiguityWarning {
    pub segment: Segment,
    pub reason: String,
}

impl fmt::Display for ParseAmbiguityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} segment is ambiguous: {}", self.segment, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    pub artifacts: CodeArtifacts,
    pub warnings: Vec<ParseAmbiguityWarning>,
}

/// One way of locating a segment in a reply.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Trimmed, non-empty content, or `None` when this strategy finds nothing.
    fn extract(&self, raw: &str) -> Option<String>;
}

fn first_non_empty(regex: &Regex, raw: &str) -> Option<String> {
    regex
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn compile(pattern: &str) -> Regex {
    // Patterns are assembled from fixed language tags and tag names.
    Regex::new(pattern).expect("extraction pattern must compile")
}

/// A fenced block whose info string is one of `tags`, matched case-insensitively.
pub struct TaggedFence {
    tags: &'static [&'static str],
    regex: Regex,
}

impl TaggedFence {
    pub fn new(tags: &'static [&'static str]) -> Self {
        let alternatives = tags.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
        let regex = compile(&format!(r"(?is)```(?:{})\s+(.*?)\s*```", alternatives));
        Self { tags, regex }
    }

    pub fn tags(&self) -> &[&'static str] {
        self.tags
    }
}

impl ExtractionStrategy for TaggedFence {
    fn name(&self) -> &'static str {
        "tagged_fence"
    }

    fn extract(&self, raw: &str) -> Option<String> {
        first_non_empty(&self.regex, raw)
    }
}

/// An untagged fenced block that starts with a document-type declaration.
///
/// Fences are paired in order, so the closing fence of one block is never read as
/// the opening fence of the next.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoctypeFence;

fn opening_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| compile(r"(?m)^[ \t]*```([^\n`]*)\n"))
}

/// `(info string, body)` for every closed fenced block, in order.
fn fenced_blocks(raw: &str) -> Vec<(&str, &str)> {
    let mut blocks = Vec::new();
    let mut rest = raw;
    while let Some(caps) = opening_fence().captures(rest) {
        let (Some(fence), Some(info)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let body_start = fence.end();
        let Some(body_len) = rest[body_start..].find("```") else {
            break;
        };
        blocks.push((info.as_str().trim(), &rest[body_start..body_start + body_len]));
        rest = &rest[body_start + body_len + 3..];
    }
    blocks
}

fn starts_with_doctype(content: &str) -> bool {
    content
        .get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<!doctype"))
}

impl ExtractionStrategy for DoctypeFence {
    fn name(&self) -> &'static str {
        "doctype_fence"
    }

    fn extract(&self, raw: &str) -> Option<String> {
        fenced_blocks(raw)
            .into_iter()
            .filter(|(info, _)| info.is_empty())
            .map(|(_, body)| body.trim())
            .find(|body| starts_with_doctype(body))
            .map(str::to_string)
    }
}

/// Content between inline `<tag>` and `</tag>`.
pub struct InlineTag {
    tag: &'static str,
    regex: Regex,
}

impl InlineTag {
    pub fn new(tag: &'static str) -> Self {
        let tag_pattern = regex::escape(tag);
        let regex = compile(&format!(
            r"(?is)<{0}\b[^>]*>(.*?)</{0}\s*>",
            tag_pattern
        ));
        Self { tag, regex }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

impl ExtractionStrategy for InlineTag {
    fn name(&self) -> &'static str {
        "inline_tag"
    }

    fn extract(&self, raw: &str) -> Option<String> {
        first_non_empty(&self.regex, raw)
    }
}

/// Runs the per-segment strategy lists and validates what they find.
pub struct ResponseExtractor {
    markup: Vec<Box<dyn ExtractionStrategy>>,
    styles: Vec<Box<dyn ExtractionStrategy>>,
    script: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self {
            markup: vec![
                Box::new(TaggedFence::new(&["html"])),
                Box::new(DoctypeFence),
            ],
            styles: vec![
                Box::new(TaggedFence::new(&["css"])),
                Box::new(InlineTag::new("style")),
            ],
            script: vec![
                Box::new(TaggedFence::new(&["javascript", "js"])),
                Box::new(InlineTag::new("script")),
            ],
        }
    }
}

impl ResponseExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategies(&self, segment: Segment) -> &[Box<dyn ExtractionStrategy>] {
        match segment {
            Segment::Markup => &self.markup,
            Segment::Styles => &self.styles,
            Segment::Script => &self.script,
        }
    }

    pub fn extract_segment(&self, raw: &str, segment: Segment) -> String {
        for strategy in self.strategies(segment) {
            if let Some(content) = strategy.extract(raw) {
                debug!(segment = %segment, strategy = strategy.name(), bytes = content.len(), "Segment extracted");
                return content;
            }
        }
        debug!(segment = %segment, "No strategy matched; segment is empty");
        String::new()
    }

    pub fn extract(&self, raw: &str) -> Extraction {
        let artifacts = CodeArtifacts {
            markup: self.extract_segment(raw, Segment::Markup),
            styles: self.extract_segment(raw, Segment::Styles),
            script: self.extract_segment(raw, Segment::Script),
        };

        let warnings: Vec<ParseAmbiguityWarning> = [Segment::Markup, Segment::Styles, Segment::Script]
            .into_iter()
            .filter_map(|segment| validate_segment(segment, artifacts.get(segment)))
            .collect();
        for warning in &warnings {
            warn!(segment = %warning.segment, reason = %warning.reason, "ParseAmbiguityWarning");
        }

        Extraction { artifacts, warnings }
    }
}

fn markup_tag() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| compile(r"<[a-zA-Z!/][^>]*>"))
}

fn style_rule() -> &'static Regex {
    static RULE: OnceLock<Regex> = OnceLock::new();
    RULE.get_or_init(|| compile(r"[^{}\s][^{}]*\{[^{}]*\}"))
}

fn script_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        compile(r"\bfunction\b|\bconst\b|\blet\b|\bvar\b|=>|\bdocument\.|\bwindow\.|\bclass\b")
    })
}

const STRUCTURAL_MARKERS: &[&str] = &[
    "<!doctype", "<html", "<body", "<main", "<div", "<header", "<section",
];

/// Lightweight content check; empty segments are never flagged.
pub fn validate_segment(segment: Segment, content: &str) -> Option<ParseAmbiguityWarning> {
    if content.is_empty() {
        return None;
    }
    let reason = match segment {
        Segment::Markup => {
            let lower = content.to_lowercase();
            if !markup_tag().is_match(content) {
                Some("no angle-bracket tags found")
            } else if !STRUCTURAL_MARKERS.iter().any(|m| lower.contains(m)) {
                Some("no document or structural element found")
            } else {
                None
            }
        }
        Segment::Styles => (!style_rule().is_match(content)).then_some("no brace-delimited rule found"),
        Segment::Script => {
            (!script_token().is_match(content)).then_some("no function, declaration or DOM access found")
        }
    };
    reason.map(|reason| ParseAmbiguityWarning {
        segment,
        reason: reason.to_string(),
    })
}
