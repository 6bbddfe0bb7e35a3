//! Property-based tests for determinism and invariants of the pure stages

use proptest::prelude::*;
use wirecode::classify::classify;
use wirecode::extract::ResponseExtractor;
use wirecode::layout::{cluster_positions, LayoutAnalyzer};
use wirecode::page::PageContext;
use wirecode::prompt::{PromptBuilder, Theme};
use wirecode::{DetectedElements, UIElement, UIElementType};

fn element_kind() -> impl Strategy<Value = UIElementType> {
    prop_oneof![
        Just(UIElementType::Navbar),
        Just(UIElementType::Menu),
        Just(UIElementType::Button),
        Just(UIElementType::InputField),
        Just(UIElementType::Heading),
        Just(UIElementType::Paragraph),
        Just(UIElementType::Image),
        Just(UIElementType::Text),
    ]
}

fn element() -> impl Strategy<Value = UIElement> {
    (
        element_kind(),
        "[a-zA-Z ]{0,20}",
        0.0f64..1200.0,
        0.0f64..1200.0,
        1.0f64..400.0,
        1.0f64..100.0,
    )
        .prop_map(|(kind, text, x, y, w, h)| UIElement::text_element(kind, &text, x, y, w, h))
}

proptest! {
    /// Same inputs always classify the same way.
    #[test]
    fn classify_is_pure(text in ".{0,80}", width in 0.0f64..2000.0, height in 0.0f64..500.0) {
        prop_assert_eq!(classify(&text, width, height), classify(&text, width, height));
    }

    /// Text with no keyword classifies by length alone.
    #[test]
    fn keywordless_text_classified_by_length(len in 0usize..120, height in 0.0f64..39.0) {
        let text = "x".repeat(len);
        let kind = classify(&text, 100.0, height);
        let expected = if len < 50 {
            UIElementType::Heading
        } else if len > 50 {
            UIElementType::Paragraph
        } else {
            UIElementType::Text
        };
        prop_assert_eq!(kind, expected);
    }

    /// Clustering keeps every position, in order, and splits only on large gaps.
    #[test]
    fn clustering_partitions_sorted_input(mut ys in prop::collection::vec(0.0f64..2000.0, 0..40)) {
        ys.sort_by(f64::total_cmp);
        let clusters = cluster_positions(&ys, 100.0);
        let flattened: Vec<f64> = clusters.iter().flatten().copied().collect();
        prop_assert_eq!(&flattened, &ys);
        for pair in clusters.windows(2) {
            let last = *pair[0].last().unwrap();
            let first = pair[1][0];
            prop_assert!(first - last > 100.0);
        }
        for cluster in &clusters {
            prop_assert!(!cluster.is_empty());
            for pair in cluster.windows(2) {
                prop_assert!(pair[1] - pair[0] <= 100.0);
            }
        }
    }

    /// Building the prompt twice from the same analysis yields identical text and fingerprint.
    #[test]
    fn prompt_is_idempotent(elements in prop::collection::vec(element(), 0..12), dark in any::<bool>()) {
        let full_text = elements.iter().map(|e| e.text.as_str()).collect::<Vec<_>>().join("\n");
        let detected = DetectedElements { elements, full_text, error: None };
        let theme = if dark { Theme::Dark } else { Theme::Light };

        let build = || {
            let layout = LayoutAnalyzer::default().analyze(&detected.elements);
            let context = PageContext::infer(&detected.full_text, &detected.elements);
            PromptBuilder::default().build(&detected, &layout, &context, theme)
        };
        let first = build();
        let second = build();
        prop_assert_eq!(&first.prompt, &second.prompt);
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
    }

    /// Fenced html content comes back unchanged after trimming.
    #[test]
    fn fenced_markup_round_trips(body in "<div>[a-zA-Z0-9 ]{0,40}</div>") {
        let reply = format!("Sure!\n```html\n{}\n```\nDone.", body);
        let extraction = ResponseExtractor::new().extract(&reply);
        prop_assert_eq!(extraction.artifacts.markup, body.trim().to_string());
    }
}
