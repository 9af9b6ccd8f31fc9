//! Property tests for normalization and entity extraction.

use dossier_core::extract_entities;
use dossier_core::model::{BBox, EntityBox, OcrResult, Word};
use dossier_core::normalize::default_normalizer;
use proptest::prelude::*;
use std::collections::HashSet;

const VOCAB: &[&str] = &[
    "John", "Smith", "Mary", "suspect", "named", "\"Bunty\"", "witness", "Mrs.", "Anita",
    "Desai", "Main", "Street.", "Acme", "Inc", "555-123-4567", "Case", "No:", "44/2023",
    "$1,200", "MH", "12", "AB", "1234", "car", "alias", "Tiger", "on", "12/05/2023", "tne",
    "1", "0", "i,", "was", "seen", "near", "x@y.org", "https://a.org/b).", "Rs.", "500",
];

const SEPARATORS: &[&str] = &[" ", " ", " ", "\n", "  ", "\n\n\n", "\t"];

fn tokens() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(VOCAB), 0..40)
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SEPARATORS)
}

fn document() -> impl Strategy<Value = (String, Vec<Word>)> {
    (tokens(), prop::collection::vec(separator(), 40), prop::collection::vec(-1.0f32..2.0, 40))
        .prop_map(|(toks, seps, confs)| {
            let mut text = String::new();
            let mut words = Vec::new();
            for (i, t) in toks.iter().enumerate() {
                text.push_str(t);
                text.push_str(seps[i]);
                let x0 = (i % 10) as f32 * 70.0;
                let y0 = (i / 10) as f32 * 25.0;
                words.push(Word::new(*t, confs[i], BBox::new(x0, y0, x0 + 60.0, y0 + 20.0)));
            }
            (text, words)
        })
}

proptest! {
    /// normalize(normalize(x)) == normalize(x)
    #[test]
    fn normalize_idempotent(s in "[a-zA-Z0-9 .,:/$|\\[\\]\t\r\n-]{0,120}") {
        let n = default_normalizer();
        let once = n.normalize(&s);
        prop_assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn normalize_idempotent_on_documents((text, _) in document()) {
        let n = default_normalizer();
        let once = n.normalize(&text);
        prop_assert_eq!(n.normalize(&once), once);
    }

    /// No two entities in a category share text, ignoring case.
    #[test]
    fn no_duplicates_per_category((text, words) in document()) {
        let entities = extract_entities(&OcrResult::new(text, words));
        for (category, list) in entities.iter() {
            let mut seen = HashSet::new();
            for e in list {
                prop_assert!(
                    seen.insert(e.text.to_lowercase()),
                    "duplicate {:?} in {}", e.text, category
                );
            }
        }
    }

    /// Every box comes from the words or is the flagged placeholder, and
    /// every confidence is within [0, 1].
    #[test]
    fn geometry_complete_and_confidence_bounded((text, words) in document()) {
        let entities = extract_entities(&OcrResult::new(text, words.clone()));
        for (_, list) in entities.iter() {
            for e in list {
                prop_assert!((0.0..=1.0).contains(&e.confidence));
                prop_assert!(e.bounding_box.width >= 0.0 && e.bounding_box.height >= 0.0);
                if e.estimated {
                    prop_assert_eq!(e.bounding_box, EntityBox::ESTIMATED);
                } else {
                    let b = e.bounding_box;
                    prop_assert!(words.iter().any(|w| w.bounding_box.x0 == b.x));
                    prop_assert!(words.iter().any(|w| w.bounding_box.y0 == b.y));
                }
            }
        }
    }

    /// Same input, same output.
    #[test]
    fn extraction_deterministic((text, words) in document()) {
        let result = OcrResult::new(text, words);
        prop_assert_eq!(extract_entities(&result), extract_entities(&result));
    }
}
