use crate::index::WordIndex;
use crate::model::{clamp_confidence, BBox, EntityBox};
use crate::recognize::Candidate;

/// Confidence assigned to entities placed on the fallback box.
pub const ESTIMATED_CONFIDENCE: f32 = 0.5;

/// Stand-in for a word confidence of exactly zero, which OCR engines use for "unknown".
pub const UNKNOWN_CONFIDENCE: f32 = 0.7;

/// Where a candidate landed on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub bounding_box: EntityBox,
    pub confidence: f32,
    pub estimated: bool,
}

impl Placement {
    fn from_word(bbox: BBox, confidence: f32) -> Self {
        Placement {
            bounding_box: bbox.to_entity_box(),
            confidence: effective_confidence(confidence),
            estimated: false,
        }
    }

    pub fn estimated() -> Self {
        Placement {
            bounding_box: EntityBox::ESTIMATED,
            confidence: ESTIMATED_CONFIDENCE,
            estimated: true,
        }
    }
}

fn effective_confidence(c: f32) -> f32 {
    let c = clamp_confidence(c);
    if c == 0.0 {
        UNKNOWN_CONFIDENCE
    } else {
        c
    }
}

/// Picks one bounding box per candidate from the document's word index.
#[derive(Debug, Clone, Copy)]
pub struct SpanResolver<'a> {
    index: &'a WordIndex,
}

impl<'a> SpanResolver<'a> {
    pub fn new(index: &'a WordIndex) -> Self {
        SpanResolver { index }
    }

    /// Native geometry, then an exact word, then a fuzzy single word, then the
    /// union of the first and last words, then the estimated placeholder.
    pub fn resolve(&self, candidate: &Candidate) -> Placement {
        if let Some((bbox, confidence)) = candidate.native {
            return Placement::from_word(bbox, confidence);
        }

        let text = candidate.text.trim();
        if let Some(record) = self.index.lookup_exact(text) {
            return Placement::from_word(record.bbox, record.confidence);
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens.as_slice() {
            [] => {}
            [single] => {
                if let Some(record) = self.index.lookup_fuzzy(single) {
                    return Placement::from_word(record.bbox, record.confidence);
                }
            }
            [first, .., last] => {
                if let (Some(a), Some(b)) =
                    (self.index.lookup_exact(first), self.index.lookup_exact(last))
                {
                    let confidence =
                        effective_confidence(a.confidence).min(effective_confidence(b.confidence));
                    return Placement {
                        bounding_box: a.bbox.union(&b.bbox).to_entity_box(),
                        confidence,
                        estimated: false,
                    };
                }
            }
        }

        tracing::debug!(text, "no word geometry for candidate; using estimated box");
        Placement::estimated()
    }
}
