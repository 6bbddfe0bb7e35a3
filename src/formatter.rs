//! Cosmetic re-indentation of generated markup and styles.
//!
//! Runs after the pipeline produced its result; it never changes what the code does,
//! only whitespace between tokens. Whitespace-sensitive bodies (`pre`, `textarea`,
//! `script`, `style`) and runs of inline content are kept intact.

use crate::extract::CodeArtifacts;
use regex::Regex;
use std::sync::OnceLock;

pub trait CodeFormatter: Send + Sync {
    fn format_markup(&self, markup: &str) -> String;
    fn format_styles(&self, styles: &str) -> String;

    /// Pretty-print markup and styles; script passes through untouched.
    fn beautify(&self, artifacts: &CodeArtifacts) -> CodeArtifacts {
        CodeArtifacts {
            markup: self.format_markup(&artifacts.markup),
            styles: self.format_styles(&artifacts.styles),
            script: artifacts.script.clone(),
        }
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that flow with surrounding text; a line break next to them would render as a space.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "i", "img",
    "input", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup",
    "time", "u", "var", "wbr",
];

/// Elements whose body is emitted byte for byte.
const RAW_TEXT_ELEMENTS: &[&str] = &["pre", "script", "style", "textarea"];

/// Line-per-token formatter with a fixed indent width.
#[derive(Debug, Clone)]
pub struct IndentFormatter {
    indent_size: usize,
}

impl Default for IndentFormatter {
    fn default() -> Self {
        Self { indent_size: 2 }
    }
}

impl IndentFormatter {
    pub fn new(indent_size: usize) -> Self {
        Self { indent_size }
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(depth * self.indent_size)
    }

    fn flush_run(&self, lines: &mut Vec<String>, run: &mut String, depth: usize) {
        let text = run.trim_end();
        if !text.is_empty() {
            lines.push(format!("{}{}", self.pad(depth), text));
        }
        run.clear();
    }

    fn flush_declaration(&self, out: &mut String, current: &mut String, depth: usize, suffix: &str) {
        let text = current.trim();
        if !text.is_empty() || !suffix.is_empty() {
            out.push_str(&self.pad(depth));
            out.push_str(text);
            if !text.is_empty() && suffix == "{" {
                out.push(' ');
            }
            out.push_str(suffix);
            out.push('\n');
        }
        current.clear();
    }
}

fn markup_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|</?[a-zA-Z!?][^>]*>|[^<]+|<")
            .expect("markup token pattern must compile")
    })
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Append text to an inline run, collapsing whitespace and dropping it at the run start.
fn push_text(run: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_whitespace() {
            if !run.is_empty() && !run.ends_with(' ') {
                run.push(' ');
            }
        } else {
            run.push(c);
        }
    }
}

/// Byte offset just past the closing tag of a raw-text element, or the end of input.
fn raw_element_end(lower: &str, from: usize, name: &str) -> usize {
    let close = format!("</{}", name);
    match lower[from..].find(&close) {
        Some(offset) => {
            let close_start = from + offset;
            lower[close_start..]
                .find('>')
                .map_or(lower.len(), |end| close_start + end + 1)
        }
        None => lower.len(),
    }
}

impl CodeFormatter for IndentFormatter {
    fn format_markup(&self, markup: &str) -> String {
        // ASCII lowercasing keeps byte offsets aligned with `markup`.
        let lower = markup.to_ascii_lowercase();
        let mut lines = Vec::new();
        let mut run = String::new();
        let mut depth = 0usize;
        let mut pos = 0usize;

        while let Some(token) = markup_token().find_at(markup, pos) {
            let text = token.as_str();
            pos = token.end();

            if text == "<" || !text.starts_with('<') {
                push_text(&mut run, text);
                continue;
            }
            if text.starts_with("<!--") {
                run.push_str(text);
                continue;
            }

            let name = tag_name(text);
            let closing = text.starts_with("</");

            if !closing && !text.ends_with("/>") && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                pos = raw_element_end(&lower, token.end(), &name);
                let element = &markup[token.start()..pos];
                if name == "textarea" {
                    run.push_str(element);
                } else {
                    self.flush_run(&mut lines, &mut run, depth);
                    lines.push(format!("{}{}", self.pad(depth), element));
                }
                continue;
            }

            if INLINE_ELEMENTS.contains(&name.as_str()) {
                run.push_str(text);
                continue;
            }

            self.flush_run(&mut lines, &mut run, depth);
            if closing {
                depth = depth.saturating_sub(1);
                lines.push(format!("{}{}", self.pad(depth), text));
                continue;
            }

            lines.push(format!("{}{}", self.pad(depth), text));
            let opens_block = !text.starts_with("<!")
                && !text.ends_with("/>")
                && !VOID_ELEMENTS.contains(&name.as_str());
            if opens_block {
                depth += 1;
            }
        }
        self.flush_run(&mut lines, &mut run, depth);
        lines.join("\n")
    }

    fn format_styles(&self, styles: &str) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        let mut parens = 0usize;
        let mut current = String::new();
        let mut quote: Option<char> = None;
        let mut in_comment = false;
        let mut chars = styles.chars().peekable();

        while let Some(c) = chars.next() {
            if in_comment {
                current.push(c);
                if c == '*' && chars.peek() == Some(&'/') {
                    current.push('/');
                    chars.next();
                    in_comment = false;
                }
                continue;
            }
            if let Some(q) = quote {
                current.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '/' if chars.peek() == Some(&'*') => {
                    current.push_str("/*");
                    chars.next();
                    in_comment = true;
                }
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' => {
                    parens += 1;
                    current.push(c);
                }
                ')' => {
                    parens = parens.saturating_sub(1);
                    current.push(c);
                }
                ';' if parens > 0 => current.push(c),
                '{' => {
                    self.flush_declaration(&mut out, &mut current, depth, "{");
                    depth += 1;
                }
                ';' => self.flush_declaration(&mut out, &mut current, depth, ";"),
                '}' => {
                    if !current.trim().is_empty() {
                        self.flush_declaration(&mut out, &mut current, depth, ";");
                    }
                    current.clear();
                    depth = depth.saturating_sub(1);
                    out.push_str(&self.pad(depth));
                    out.push_str("}\n");
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() && !current.ends_with(' ') {
                        current.push(' ');
                    }
                }
                _ => current.push(c),
            }
        }
        self.flush_declaration(&mut out, &mut current, depth, "");
        out.trim_end().to_string()
    }
}
