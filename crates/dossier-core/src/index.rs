use crate::model::{BBox, Word};
use std::collections::HashMap;

/// Geometry and confidence recorded for one indexed word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordRecord {
    pub confidence: f32,
    pub bbox: BBox,
}

/// Lookup from lowercase word text to its OCR geometry.
///
/// Keys remember the position of their first insertion so fuzzy scans are
/// deterministic; the stored record is the last one written.
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    keys: Vec<String>,
    records: HashMap<String, WordRecord>,
}

impl WordIndex {
    pub fn build(words: &[Word]) -> Self {
        let mut index = WordIndex::default();
        for word in words {
            index.insert(&word.text, word.confidence, word.bounding_box);
        }
        index
    }

    pub fn insert(&mut self, text: &str, confidence: f32, bbox: BBox) {
        let key = text.to_lowercase();
        if key.is_empty() {
            return;
        }
        let record = WordRecord { confidence, bbox };
        if self.records.insert(key.clone(), record).is_none() {
            self.keys.push(key);
        }
    }

    pub fn lookup_exact(&self, text: &str) -> Option<&WordRecord> {
        self.records.get(&text.to_lowercase())
    }

    /// Exact lookup, then the first key (in insertion order) that contains
    /// `text` or is contained in it.
    pub fn lookup_fuzzy(&self, text: &str) -> Option<&WordRecord> {
        let needle = text.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Some(record) = self.records.get(&needle) {
            return Some(record);
        }
        self.keys
            .iter()
            .find(|k| k.contains(needle.as_str()) || needle.contains(k.as_str()))
            .and_then(|k| self.records.get(k))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
