//! Page purpose and color scheme inference.

use crate::element::{UIElement, UIElementType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Login,
    Registration,
    ECommerce,
    Contact,
    About,
    ProductService,
    Blog,
    Dashboard,
    Profile,
    FormBased,
    Gallery,
    #[default]
    GeneralLanding,
}

impl PageType {
    pub fn label(&self) -> &'static str {
        match self {
            PageType::Login => "login page",
            PageType::Registration => "registration page",
            PageType::ECommerce => "e-commerce page",
            PageType::Contact => "contact page",
            PageType::About => "about page",
            PageType::ProductService => "product/service page",
            PageType::Blog => "blog page",
            PageType::Dashboard => "dashboard",
            PageType::Profile => "profile page",
            PageType::FormBased => "form-based page",
            PageType::Gallery => "gallery/portfolio page",
            PageType::GeneralLanding => "general landing page",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered keyword groups; the first group with any hit decides the page type.
const PAGE_KEYWORDS: &[(PageType, &[&str])] = &[
    (PageType::Login, &["login", "log in", "sign in", "signin", "forgot password"]),
    (PageType::Registration, &["register", "sign up", "signup", "create account", "join now"]),
    (PageType::ECommerce, &["cart", "checkout", "buy now", "add to cart", "shop", "price"]),
    (PageType::Contact, &["contact us", "get in touch", "message us", "send message"]),
    (PageType::About, &["about us", "our team", "our story", "mission"]),
    (PageType::ProductService, &["product", "service", "features", "pricing", "plans"]),
    (PageType::Blog, &["blog", "article", "posted", "read more", "comments"]),
    (PageType::Dashboard, &["dashboard", "analytics", "statistics", "overview", "reports"]),
    (PageType::Profile, &["profile", "my account", "settings", "edit profile"]),
];

const FORM_FIELD_THRESHOLD: usize = 2;
const GALLERY_IMAGE_THRESHOLD: usize = 3;

/// A keyword hit must start a word; multi-word phrases must also end one.
/// Single words may carry a suffix, so `products` still counts as `product`.
fn mentions(corpus: &str, keyword: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric();
    corpus.match_indices(keyword).any(|(start, _)| {
        let starts_word = !corpus[..start].chars().next_back().is_some_and(is_word);
        let end = start + keyword.len();
        let ends_word = !keyword.contains(' ') || !corpus[end..].chars().next().is_some_and(is_word);
        starts_word && ends_word
    })
}

/// Infer what the page is for from its text, falling back to element counts.
pub fn detect_page_type(full_text: &str, elements: &[UIElement]) -> PageType {
    let mut corpus = full_text.to_lowercase();
    for element in elements {
        corpus.push(' ');
        corpus.push_str(&element.text.to_lowercase());
    }

    for (page_type, keywords) in PAGE_KEYWORDS {
        if keywords.iter().any(|k| mentions(&corpus, k)) {
            return *page_type;
        }
    }

    let input_fields = elements
        .iter()
        .filter(|e| e.kind == UIElementType::InputField)
        .count();
    if input_fields > FORM_FIELD_THRESHOLD {
        return PageType::FormBased;
    }

    let images = elements.iter().filter(|e| e.is_image()).count();
    if images > GALLERY_IMAGE_THRESHOLD {
        return PageType::Gallery;
    }

    PageType::GeneralLanding
}

/// Fallback palette used when the wireframe carries no color information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub text: String,
    pub background: String,
    pub accent: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#3498db".to_string(),
            secondary: "#2ecc71".to_string(),
            text: "#333333".to_string(),
            background: "#ffffff".to_string(),
            accent: "#e74c3c".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ColorScheme {
    Detected { colors: Vec<String>, note: String },
    Default { palette: Palette, note: String },
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Default {
            palette: Palette::default(),
            note: "Default professional palette; no colors were detected in the wireframe".to_string(),
        }
    }
}

/// Collect element colors verbatim, or fall back to the default palette.
pub fn detect_color_scheme(elements: &[UIElement]) -> ColorScheme {
    let colors: Vec<String> = elements
        .iter()
        .flat_map(|e| [e.color.as_ref(), e.background_color.as_ref()])
        .flatten()
        .cloned()
        .collect();

    if colors.is_empty() {
        ColorScheme::default()
    } else {
        ColorScheme::Detected {
            colors,
            note: "Colors detected from wireframe element attributes".to_string(),
        }
    }
}

/// Page purpose plus colors, handed to the prompt builder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageContext {
    pub page_type: PageType,
    pub color_scheme: ColorScheme,
}

impl PageContext {
    pub fn infer(full_text: &str, elements: &[UIElement]) -> Self {
        Self {
            page_type: detect_page_type(full_text, elements),
            color_scheme: detect_color_scheme(elements),
        }
    }
}
