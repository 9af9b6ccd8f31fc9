use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pixel rectangle in the source image's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Build a box, clamping the far corner so that `x1 >= x0` and `y1 >= y0`.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        BBox {
            x0,
            y0,
            x1: x1.max(x0),
            y1: y1.max(y0),
        }
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    pub fn to_entity_box(&self) -> EntityBox {
        EntityBox {
            x: self.x0,
            y: self.y0,
            width: (self.x1 - self.x0).max(0.0),
            height: (self.y1 - self.y0).max(0.0),
        }
    }
}

/// Entity geometry as a viewer consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl EntityBox {
    /// Placeholder used when no word geometry can be derived for an entity.
    pub const ESTIMATED: EntityBox = EntityBox {
        x: 50.0,
        y: 50.0,
        width: 100.0,
        height: 30.0,
    };
}

/// One recognized token with its confidence and position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub text: String,
    /// Recognition confidence in [0, 1].
    pub confidence: f32,
    pub bounding_box: BBox,
}

impl Word {
    pub fn new(text: impl Into<String>, confidence: f32, bounding_box: BBox) -> Self {
        Word {
            text: text.into(),
            confidence: clamp_confidence(confidence),
            bounding_box,
        }
    }
}

/// Where the word boxes of an [`OcrResult`] came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometrySource {
    /// Reported by the OCR engine.
    Native,
    /// Laid out on a fixed grid because the collaborator returned text only.
    Synthesized,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionCondition {
    /// The engine ran successfully but recognized no text.
    NoTextDetected,
}

impl fmt::Display for ExtractionCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionCondition::NoTextDetected => write!(f, "no_text_detected"),
        }
    }
}

/// Raw extraction output for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    pub words: Vec<Word>,
    #[serde(default)]
    pub geometry: GeometrySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ExtractionCondition>,
}

impl OcrResult {
    /// Result carrying engine-reported word geometry.
    pub fn new(text: impl Into<String>, words: Vec<Word>) -> Self {
        let geometry = if words.is_empty() {
            GeometrySource::None
        } else {
            GeometrySource::Native
        };
        OcrResult {
            text: text.into(),
            words,
            geometry,
            error: None,
            condition: None,
        }
    }

    /// Result for text that has no word list at all.
    pub fn text_only(text: impl Into<String>) -> Self {
        OcrResult::new(text, Vec::new())
    }

    pub fn failed(text: impl Into<String>, reason: impl Into<String>) -> Self {
        OcrResult {
            text: text.into(),
            words: Vec::new(),
            geometry: GeometrySource::None,
            error: Some(reason.into()),
            condition: None,
        }
    }

    pub fn no_text() -> Self {
        OcrResult {
            condition: Some(ExtractionCondition::NoTextDetected),
            ..OcrResult::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityCategory {
    Persons,
    Places,
    Organizations,
    PhoneNumbers,
    Dates,
    Emails,
    Urls,
    Amounts,
    Vehicles,
    Suspects,
    Witnesses,
    CaseNumbers,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 12] = [
        EntityCategory::Persons,
        EntityCategory::Places,
        EntityCategory::Organizations,
        EntityCategory::PhoneNumbers,
        EntityCategory::Dates,
        EntityCategory::Emails,
        EntityCategory::Urls,
        EntityCategory::Amounts,
        EntityCategory::Vehicles,
        EntityCategory::Suspects,
        EntityCategory::Witnesses,
        EntityCategory::CaseNumbers,
    ];

    /// The wire key, e.g. `phoneNumbers`.
    pub fn key(&self) -> &'static str {
        match self {
            EntityCategory::Persons => "persons",
            EntityCategory::Places => "places",
            EntityCategory::Organizations => "organizations",
            EntityCategory::PhoneNumbers => "phoneNumbers",
            EntityCategory::Dates => "dates",
            EntityCategory::Emails => "emails",
            EntityCategory::Urls => "urls",
            EntityCategory::Amounts => "amounts",
            EntityCategory::Vehicles => "vehicles",
            EntityCategory::Suspects => "suspects",
            EntityCategory::Witnesses => "witnesses",
            EntityCategory::CaseNumbers => "caseNumbers",
        }
    }

    /// Accepts wire keys and a few spellings language models tend to produce
    /// (`phone_numbers`, `Persons`, `people`).
    pub fn from_str_loose(s: &str) -> Option<EntityCategory> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let category = match folded.as_str() {
            "persons" | "person" | "people" | "names" => EntityCategory::Persons,
            "places" | "place" | "locations" | "location" => EntityCategory::Places,
            "organizations" | "organization" | "organisations" | "orgs" => {
                EntityCategory::Organizations
            }
            "phonenumbers" | "phonenumber" | "phones" => EntityCategory::PhoneNumbers,
            "dates" | "date" => EntityCategory::Dates,
            "emails" | "email" => EntityCategory::Emails,
            "urls" | "url" => EntityCategory::Urls,
            "amounts" | "amount" | "money" => EntityCategory::Amounts,
            "vehicles" | "vehicle" => EntityCategory::Vehicles,
            "suspects" | "suspect" => EntityCategory::Suspects,
            "witnesses" | "witness" => EntityCategory::Witnesses,
            "casenumbers" | "casenumber" => EntityCategory::CaseNumbers,
            _ => return None,
        };
        Some(category)
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub text: String,
    pub confidence: f32,
    pub bounding_box: EntityBox,
    /// True when `bounding_box` is the fixed placeholder rather than derived from words.
    #[serde(default)]
    pub estimated: bool,
    /// Parsed numeric value, set for amounts only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
}

/// Entities grouped by category, in discovery order, deduplicated per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySet {
    categories: BTreeMap<EntityCategory, Vec<Entity>>,
}

impl Default for EntitySet {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitySet {
    /// An empty set with every category present.
    pub fn new() -> Self {
        EntitySet {
            categories: EntityCategory::ALL
                .iter()
                .map(|c| (*c, Vec::new()))
                .collect(),
        }
    }

    /// Append `entity` unless the category already holds the same text
    /// (case-insensitive). Returns whether it was added.
    pub fn insert(&mut self, category: EntityCategory, entity: Entity) -> bool {
        let list = self.categories.entry(category).or_default();
        if list.iter().any(|e| same_text(&e.text, &entity.text)) {
            return false;
        }
        list.push(entity);
        true
    }

    pub fn get(&self, category: EntityCategory) -> &[Entity] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, category: EntityCategory, text: &str) -> bool {
        self.get(category).iter().any(|e| same_text(&e.text, text))
    }

    /// Drop every entity of a category, keeping the (empty) key.
    pub fn clear_category(&mut self, category: EntityCategory) {
        self.categories.insert(category, Vec::new());
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityCategory, &[Entity])> {
        self.categories.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Total number of entities across categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Clamp to [0, 1], mapping NaN to 0.
pub fn clamp_confidence(c: f32) -> f32 {
    if c.is_nan() {
        0.0
    } else {
        c.clamp(0.0, 1.0)
    }
}

/// Full pipeline output for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentExtraction {
    /// Normalized text.
    pub text: String,
    pub entities: EntitySet,
    pub geometry: GeometrySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ExtractionCondition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(text: &str) -> Entity {
        Entity {
            text: text.to_string(),
            confidence: 0.9,
            bounding_box: EntityBox::ESTIMATED,
            estimated: true,
            value: None,
        }
    }

    #[test]
    fn test_bbox_clamps_inverted_corners() {
        let b = BBox::new(10.0, 10.0, 5.0, 2.0);
        assert_eq!(b.x1, 10.0);
        assert_eq!(b.y1, 10.0);
        let eb = b.to_entity_box();
        assert_eq!(eb.width, 0.0);
        assert_eq!(eb.height, 0.0);
    }

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(10.0, 12.0, 40.0, 20.0);
        let b = BBox::new(42.0, 10.0, 80.0, 22.0);
        assert_eq!(a.union(&b), BBox::new(10.0, 10.0, 80.0, 22.0));
    }

    #[test]
    fn test_insert_dedups_case_insensitively() {
        let mut set = EntitySet::new();
        assert!(set.insert(EntityCategory::Persons, entity("John Smith")));
        assert!(!set.insert(EntityCategory::Persons, entity("JOHN SMITH")));
        assert_eq!(set.get(EntityCategory::Persons).len(), 1);
        assert_eq!(set.get(EntityCategory::Persons)[0].text, "John Smith");
    }

    #[test]
    fn test_dedup_is_scoped_per_category() {
        let mut set = EntitySet::new();
        assert!(set.insert(EntityCategory::Persons, entity("Bunty")));
        assert!(set.insert(EntityCategory::Suspects, entity("Bunty")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_all_categories_serialize_as_keys() {
        let json = serde_json::to_value(EntitySet::new()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 12);
        assert!(obj.contains_key("phoneNumbers"));
        assert!(obj.contains_key("caseNumbers"));
    }

    #[test]
    fn test_category_from_str_loose() {
        assert_eq!(
            EntityCategory::from_str_loose("phone_numbers"),
            Some(EntityCategory::PhoneNumbers)
        );
        assert_eq!(
            EntityCategory::from_str_loose("Persons"),
            Some(EntityCategory::Persons)
        );
        assert_eq!(EntityCategory::from_str_loose("weather"), None);
    }

    #[test]
    fn test_confidence_clamp() {
        assert_eq!(clamp_confidence(1.7), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(f32::NAN), 0.0);
    }
}
