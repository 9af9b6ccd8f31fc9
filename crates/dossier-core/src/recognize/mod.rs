pub mod patterns;
pub mod phrase;
pub mod token;

use crate::error::DossierError;
use crate::model::{BBox, EntityCategory, Word};
use regex::Regex;
use std::collections::BTreeSet;

pub use phrase::{LineHeuristic, OrganizationMatcher, PlaceMatcher};
pub use token::TokenMatcher;

/// What a matcher sees: the normalized text and the raw OCR words.
#[derive(Debug, Clone, Copy)]
pub struct RecognitionInput<'a> {
    pub text: &'a str,
    pub words: &'a [Word],
}

/// A candidate span proposed by a matcher, not yet placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    /// Geometry and confidence of the word the candidate was found in, if any.
    pub native: Option<(BBox, f32)>,
}

impl Candidate {
    pub fn from_text(text: impl Into<String>) -> Self {
        Candidate {
            text: text.into(),
            native: None,
        }
    }

    pub fn from_word(text: impl Into<String>, word: &Word) -> Self {
        Candidate {
            text: text.into(),
            native: Some((word.bounding_box, word.confidence)),
        }
    }
}

/// A recognizer for one entity category.
pub trait EntityMatcher: Send + Sync {
    fn category(&self) -> EntityCategory;

    /// Short name for diagnostics.
    fn name(&self) -> &str;

    fn find(&self, input: &RecognitionInput<'_>) -> Result<Vec<Candidate>, DossierError>;
}

/// Output of [`Recognizer::recognize`].
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    /// Candidates in matcher order, then discovery order.
    pub candidates: Vec<(EntityCategory, Candidate)>,
    /// Categories dropped because one of their matchers failed.
    pub failed: BTreeSet<EntityCategory>,
}

/// Ordered pipeline of entity matchers.
pub struct Recognizer {
    matchers: Vec<Box<dyn EntityMatcher>>,
}

impl Recognizer {
    /// A recognizer with no matchers installed.
    pub fn empty() -> Self {
        Recognizer {
            matchers: Vec::new(),
        }
    }

    pub fn with_matcher(mut self, matcher: impl EntityMatcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    pub fn push(&mut self, matcher: Box<dyn EntityMatcher>) {
        self.matchers.push(matcher);
    }

    pub fn matchers(&self) -> impl Iterator<Item = &dyn EntityMatcher> {
        self.matchers.iter().map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Run every matcher in order. A failing matcher removes its whole
    /// category from the output; other categories are unaffected.
    pub fn recognize(&self, input: &RecognitionInput<'_>) -> Recognition {
        let mut recognition = Recognition::default();
        for matcher in &self.matchers {
            match matcher.find(input) {
                Ok(found) => {
                    tracing::trace!(
                        matcher = matcher.name(),
                        count = found.len(),
                        "matcher finished"
                    );
                    recognition
                        .candidates
                        .extend(found.into_iter().map(|c| (matcher.category(), c)));
                }
                Err(e) => {
                    tracing::warn!(
                        matcher = matcher.name(),
                        category = %matcher.category(),
                        error = %e,
                        "matcher failed; dropping category"
                    );
                    recognition.failed.insert(matcher.category());
                }
            }
        }
        if !recognition.failed.is_empty() {
            let failed = &recognition.failed;
            recognition
                .candidates
                .retain(|(category, _)| !failed.contains(category));
        }
        recognition
    }
}

impl Default for Recognizer {
    /// persons, organizations, places, the token categories, suspects,
    /// aliases, witnesses, then the per-line heuristics.
    fn default() -> Self {
        let mut r = Recognizer::empty()
            .with_matcher(RegexMatcher::from_regex(
                EntityCategory::Persons,
                "persons",
                patterns::PERSON.clone(),
            ))
            .with_matcher(OrganizationMatcher)
            .with_matcher(PlaceMatcher);
        for matcher in token::default_token_matchers() {
            r = r.with_matcher(matcher);
        }
        r.with_matcher(RegexMatcher::from_regex(
            EntityCategory::Suspects,
            "suspects",
            patterns::SUSPECT.clone(),
        ))
        .with_matcher(RegexMatcher::from_regex(
            EntityCategory::Suspects,
            "aliases",
            patterns::ALIAS.clone(),
        ))
        .with_matcher(RegexMatcher::from_regex(
            EntityCategory::Witnesses,
            "witnesses",
            patterns::WITNESS.clone(),
        ))
        .with_matcher(LineHeuristic::witness_line())
        .with_matcher(LineHeuristic::suspect_line())
        .with_matcher(LineHeuristic::vehicle_line())
    }
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.matchers.iter().map(|m| m.name()))
            .finish()
    }
}

/// Full-text regex matcher. The entity is the first capture group that
/// participated in the match, or the whole match when there is none.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    category: EntityCategory,
    name: String,
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(
        category: EntityCategory,
        name: impl Into<String>,
        pattern: &str,
    ) -> Result<Self, DossierError> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|e| DossierError::Pattern {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(RegexMatcher {
            category,
            name,
            regex,
        })
    }

    pub fn from_regex(category: EntityCategory, name: impl Into<String>, regex: Regex) -> Self {
        RegexMatcher {
            category,
            name: name.into(),
            regex,
        }
    }
}

impl EntityMatcher for RegexMatcher {
    fn category(&self) -> EntityCategory {
        self.category
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, input: &RecognitionInput<'_>) -> Result<Vec<Candidate>, DossierError> {
        let mut out = Vec::new();
        for caps in self.regex.captures_iter(input.text) {
            let span = caps
                .iter()
                .skip(1)
                .flatten()
                .find(|m| !m.as_str().trim().is_empty())
                .or_else(|| caps.get(0));
            if let Some(m) = span {
                let text = m.as_str().trim();
                if !text.is_empty() {
                    out.push(Candidate::from_text(text));
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(r: &Recognition, category: EntityCategory) -> Vec<String> {
        r.candidates
            .iter()
            .filter(|(c, _)| *c == category)
            .map(|(_, cand)| cand.text.clone())
            .collect()
    }

    fn run(text: &str) -> Recognition {
        Recognizer::default().recognize(&RecognitionInput { text, words: &[] })
    }

    struct Failing;

    impl EntityMatcher for Failing {
        fn category(&self) -> EntityCategory {
            EntityCategory::Persons
        }
        fn name(&self) -> &str {
            "failing"
        }
        fn find(&self, _: &RecognitionInput<'_>) -> Result<Vec<Candidate>, DossierError> {
            Err(DossierError::Extraction("boom".into()))
        }
    }

    #[test]
    fn test_default_order() {
        let r = Recognizer::default();
        let names: Vec<&str> = r.matchers().map(|m| m.name()).collect();
        assert_eq!(names.first(), Some(&"persons"));
        assert_eq!(names[1], "organizations");
        assert_eq!(names[2], "places");
        assert_eq!(names[3], "phoneNumbers");
        assert_eq!(names.last(), Some(&"vehicle-line"));
    }

    #[test]
    fn test_persons() {
        let r = run("John Smith was seen with Mary Jane Watson.");
        assert_eq!(texts(&r, EntityCategory::Persons), ["John Smith", "Mary Jane Watson"]);
    }

    #[test]
    fn test_persons_do_not_span_lines() {
        let r = run("John\nSmith");
        assert!(texts(&r, EntityCategory::Persons).is_empty());
    }

    #[test]
    fn test_suspect_named_quoted() {
        let r = run("suspect named \"Bunty\"");
        assert!(texts(&r, EntityCategory::Suspects).contains(&"Bunty".to_string()));
    }

    #[test]
    fn test_suspect_identified_as() {
        let r = run("The Accused identified as Ravi Kumar fled.");
        assert!(texts(&r, EntityCategory::Suspects).contains(&"Ravi Kumar".to_string()));
    }

    #[test]
    fn test_aliases() {
        let r = run("He goes by alias Chotu and 'Tiger' too");
        let suspects = texts(&r, EntityCategory::Suspects);
        assert!(suspects.contains(&"Chotu".to_string()));
        assert!(suspects.contains(&"Tiger".to_string()));
    }

    #[test]
    fn test_aliases_at_sentence_start() {
        let r = run("As Bunty he ran. Alias Chotu was seen");
        let suspects = texts(&r, EntityCategory::Suspects);
        assert!(suspects.contains(&"Bunty".to_string()));
        assert!(suspects.contains(&"Chotu".to_string()));
    }

    #[test]
    fn test_alias_ignores_lowercase_after_as() {
        let r = run("it was seen as soon as possible");
        assert!(texts(&r, EntityCategory::Suspects).is_empty());
    }

    #[test]
    fn test_witnesses() {
        let r = run("Statement by Mrs. Anita Desai at noon.");
        assert!(texts(&r, EntityCategory::Witnesses).contains(&"Anita Desai".to_string()));
    }

    #[test]
    fn test_failing_matcher_drops_only_its_category() {
        let r = Recognizer::default().with_matcher(Failing);
        let out = r.recognize(&RecognitionInput {
            text: "John Smith called 555-123-4567",
            words: &[],
        });
        assert!(out.failed.contains(&EntityCategory::Persons));
        assert!(texts(&out, EntityCategory::Persons).is_empty());
        assert_eq!(texts(&out, EntityCategory::PhoneNumbers), ["555-123-4567"]);
    }

    #[test]
    fn test_custom_regex_matcher() {
        let m = RegexMatcher::new(EntityCategory::CaseNumbers, "docket", r"DKT-(\d+)").unwrap();
        let r = Recognizer::empty().with_matcher(m);
        let out = r.recognize(&RecognitionInput {
            text: "see DKT-991",
            words: &[],
        });
        assert_eq!(texts(&out, EntityCategory::CaseNumbers), ["991"]);
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let err = RegexMatcher::new(EntityCategory::Dates, "bad", "(").unwrap_err();
        assert!(matches!(err, DossierError::Pattern { .. }));
    }
}
