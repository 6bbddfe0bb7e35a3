//! Integration tests for parsing realistic model replies.

use wirecode::extract::{ResponseExtractor, Segment};
use wirecode::formatter::{CodeFormatter, IndentFormatter};

#[test]
fn test_single_document_with_inline_style_and_script() {
    let reply = "I put everything in one file:\n\n```\n<!DOCTYPE html>\n<html>\n<head>\n<style>\n.hero { padding: 2rem; }\n</style>\n</head>\n<body><main class=\"hero\">Hi</main>\n<script>\nconst hero = document.querySelector('.hero');\n</script>\n</body>\n</html>\n```";

    let extraction = ResponseExtractor::new().extract(reply);
    let artifacts = &extraction.artifacts;

    assert!(artifacts.markup.starts_with("<!DOCTYPE html>"));
    assert!(artifacts.markup.ends_with("</html>"));
    assert_eq!(artifacts.styles.trim(), ".hero { padding: 2rem; }");
    assert_eq!(
        artifacts.script.trim(),
        "const hero = document.querySelector('.hero');"
    );
    assert!(extraction.warnings.is_empty());
}

#[test]
fn test_js_shorthand_fence() {
    let reply = "```HTML\n<div class=\"card\"></div>\n```\n```js\nfunction toggle() { return 1; }\n```";
    let extraction = ResponseExtractor::new().extract(reply);
    assert_eq!(extraction.artifacts.markup, "<div class=\"card\"></div>");
    assert_eq!(extraction.artifacts.get(Segment::Script), "function toggle() { return 1; }");
    assert_eq!(extraction.artifacts.styles, "");
}

#[test]
fn test_prose_only_reply_extracts_nothing() {
    let extraction = ResponseExtractor::new().extract("I'm unable to generate code for this image.");
    assert!(extraction.artifacts.markup.is_empty());
    assert!(extraction.artifacts.styles.is_empty());
    assert!(extraction.artifacts.script.is_empty());
    assert!(extraction.warnings.is_empty());
}

#[test]
fn test_ambiguous_styles_reported_but_kept() {
    let reply = "```html\n<!DOCTYPE html><html></html>\n```\n```css\nuse a blue theme\n```";
    let extraction = ResponseExtractor::new().extract(reply);
    assert_eq!(extraction.artifacts.styles, "use a blue theme");
    assert_eq!(extraction.warnings.len(), 1);
    assert_eq!(extraction.warnings[0].segment, Segment::Styles);
}

#[test]
fn test_beautify_after_extraction_leaves_script_alone() {
    let reply = "```html\n<html><body><p>Hi</p></body></html>\n```\n```css\np{color:red}\n```\n```javascript\nlet   spaced  =  1;\n```";
    let extraction = ResponseExtractor::new().extract(reply);
    let pretty = IndentFormatter::default().beautify(&extraction.artifacts);

    assert_eq!(
        pretty.markup,
        "<html>\n  <body>\n    <p>\n      Hi\n    </p>\n  </body>\n</html>"
    );
    assert_eq!(pretty.styles, "p {\n  color:red;\n}");
    assert_eq!(pretty.script, "let   spaced  =  1;");
}
