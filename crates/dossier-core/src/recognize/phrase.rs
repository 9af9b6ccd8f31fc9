use crate::error::DossierError;
use crate::model::EntityCategory;
use crate::recognize::patterns;
use crate::recognize::{Candidate, EntityMatcher, RecognitionInput};
use regex::Regex;

/// Capitalized phrases ending in a company suffix (`Acme Widgets Inc`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationMatcher;

impl EntityMatcher for OrganizationMatcher {
    fn category(&self) -> EntityCategory {
        EntityCategory::Organizations
    }

    fn name(&self) -> &str {
        "organizations"
    }

    fn find(&self, input: &RecognitionInput<'_>) -> Result<Vec<Candidate>, DossierError> {
        Ok(input
            .text
            .lines()
            .flat_map(|line| patterns::ORGANIZATION.find_iter(line))
            .map(|m| Candidate::from_text(m.as_str()))
            .collect())
    }
}

/// `<Capitalized> <Indicator>` pairs such as `Main Street` or `Kings County`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceMatcher;

fn strip_edge_punct(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

impl EntityMatcher for PlaceMatcher {
    fn category(&self) -> EntityCategory {
        EntityCategory::Places
    }

    fn name(&self) -> &str {
        "places"
    }

    fn find(&self, input: &RecognitionInput<'_>) -> Result<Vec<Candidate>, DossierError> {
        let mut out = Vec::new();
        for line in input.text.lines() {
            let tokens: Vec<&str> = line.split(' ').map(strip_edge_punct).collect();
            for (i, token) in tokens.iter().enumerate().skip(1) {
                if !patterns::PLACE_INDICATORS.contains(token) {
                    continue;
                }
                let prev = tokens[i - 1];
                if patterns::CAPITALIZED_WORD.is_match(prev) {
                    out.push(Candidate::from_text(format!("{} {}", prev, token)));
                }
            }
        }
        Ok(out)
    }
}

/// Per-line fallback: when a line mentions one of `keywords` (and none of
/// `excluded`), its first `pattern` hit becomes an entity.
#[derive(Debug, Clone)]
pub struct LineHeuristic {
    category: EntityCategory,
    name: &'static str,
    keywords: &'static [&'static str],
    excluded: &'static [&'static str],
    pattern: Regex,
}

impl LineHeuristic {
    pub fn new(
        category: EntityCategory,
        name: &'static str,
        keywords: &'static [&'static str],
        pattern: Regex,
    ) -> Self {
        LineHeuristic {
            category,
            name,
            keywords,
            excluded: &[],
            pattern,
        }
    }

    pub fn excluding(mut self, excluded: &'static [&'static str]) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn witness_line() -> Self {
        LineHeuristic::new(
            EntityCategory::Witnesses,
            "witness-line",
            &["witness", "mr.", "mrs.", "ms."],
            patterns::TWO_CAPITALIZED.clone(),
        )
    }

    pub fn suspect_line() -> Self {
        LineHeuristic::new(
            EntityCategory::Suspects,
            "suspect-line",
            &["suspect", "accused", "alias"],
            patterns::ONE_CAPITALIZED.clone(),
        )
        .excluding(&["section"])
    }

    pub fn vehicle_line() -> Self {
        LineHeuristic::new(
            EntityCategory::Vehicles,
            "vehicle-line",
            &["vehicle", "registration", "car", "bike"],
            patterns::VEHICLE.clone(),
        )
    }

    fn applies_to(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k))
            && !self.excluded.iter().any(|k| lower.contains(k))
    }
}

impl EntityMatcher for LineHeuristic {
    fn category(&self) -> EntityCategory {
        self.category
    }

    fn name(&self) -> &str {
        self.name
    }

    fn find(&self, input: &RecognitionInput<'_>) -> Result<Vec<Candidate>, DossierError> {
        Ok(input
            .text
            .lines()
            .filter(|line| self.applies_to(line))
            .filter_map(|line| self.pattern.find(line))
            .map(|m| Candidate::from_text(m.as_str().trim()))
            .collect())
    }
}
