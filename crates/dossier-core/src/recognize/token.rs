use crate::error::DossierError;
use crate::model::EntityCategory;
use crate::recognize::patterns;
use crate::recognize::{Candidate, EntityMatcher, RecognitionInput};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Matcher for short token-shaped entities (phone numbers, dates, plates, ...).
///
/// Each OCR word is scanned first, so a hit inside a single word keeps that
/// word's geometry. The normalized text is scanned afterwards to catch
/// entities split across words or documents without a word list.
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    category: EntityCategory,
    regex: Regex,
    trim_trailing: &'static [char],
}

impl TokenMatcher {
    pub fn new(category: EntityCategory, regex: Regex) -> Self {
        TokenMatcher {
            category,
            regex,
            trim_trailing: &[],
        }
    }

    /// Strip these characters from the end of every match.
    pub fn trim_trailing(mut self, chars: &'static [char]) -> Self {
        self.trim_trailing = chars;
        self
    }

    fn clean<'a>(&self, matched: &'a str) -> &'a str {
        matched.trim().trim_end_matches(self.trim_trailing)
    }
}

impl EntityMatcher for TokenMatcher {
    fn category(&self) -> EntityCategory {
        self.category
    }

    fn name(&self) -> &str {
        self.category.key()
    }

    fn find(&self, input: &RecognitionInput<'_>) -> Result<Vec<Candidate>, DossierError> {
        let mut out = Vec::new();
        for word in input.words {
            if let Some(m) = self.regex.find(&word.text) {
                let text = self.clean(m.as_str());
                if !text.is_empty() {
                    out.push(Candidate::from_word(text, word));
                }
            }
        }
        for m in self.regex.find_iter(input.text) {
            let text = self.clean(m.as_str());
            if !text.is_empty() {
                out.push(Candidate::from_text(text));
            }
        }
        Ok(out)
    }
}

/// The token matchers in their default order.
pub fn default_token_matchers() -> Vec<TokenMatcher> {
    vec![
        TokenMatcher::new(EntityCategory::PhoneNumbers, patterns::PHONE.clone()),
        TokenMatcher::new(EntityCategory::Dates, patterns::DATE.clone()),
        TokenMatcher::new(EntityCategory::Emails, patterns::EMAIL.clone()),
        TokenMatcher::new(EntityCategory::Urls, patterns::URL.clone())
            .trim_trailing(&['.', ',', ';', ':', ')']),
        TokenMatcher::new(EntityCategory::Amounts, patterns::AMOUNT.clone()),
        TokenMatcher::new(EntityCategory::Vehicles, patterns::VEHICLE.clone()),
        TokenMatcher::new(EntityCategory::CaseNumbers, patterns::CASE_NUMBER.clone()),
    ]
}

/// Parse the numeric value of an amount such as `$1,200.50` or `Rs. 500`.
pub fn amount_value(text: &str) -> Option<Decimal> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(digits.trim_end_matches('.')).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Word};
    use rust_decimal_macros::dec;

    fn matcher(category: EntityCategory) -> TokenMatcher {
        default_token_matchers()
            .into_iter()
            .find(|m| m.category() == category)
            .unwrap()
    }

    #[test]
    fn test_word_hit_carries_native_geometry() {
        let words = vec![
            Word::new("Contact:", 0.9, BBox::new(0.0, 0.0, 50.0, 10.0)),
            Word::new("555-123-4567", 0.8, BBox::new(55.0, 0.0, 140.0, 10.0)),
        ];
        let input = RecognitionInput {
            text: "Contact: 555-123-4567",
            words: &words,
        };
        let found = matcher(EntityCategory::PhoneNumbers).find(&input).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text, "555-123-4567");
        assert_eq!(found[0].native, Some((BBox::new(55.0, 0.0, 140.0, 10.0), 0.8)));
        assert_eq!(found[1].native, None);
    }

    #[test]
    fn test_word_hit_uses_matched_substring() {
        let words = vec![Word::new("(ph:555-123-4567)", 0.9, BBox::new(0.0, 0.0, 9.0, 9.0))];
        let input = RecognitionInput {
            text: "",
            words: &words,
        };
        let found = matcher(EntityCategory::PhoneNumbers).find(&input).unwrap();
        assert_eq!(found[0].text, "555-123-4567");
    }

    #[test]
    fn test_url_trailing_punctuation_trimmed() {
        let input = RecognitionInput {
            text: "(see https://example.com/report),",
            words: &[],
        };
        let found = matcher(EntityCategory::Urls).find(&input).unwrap();
        assert_eq!(found[0].text, "https://example.com/report");
    }

    #[test]
    fn test_amount_value() {
        assert_eq!(amount_value("$1,200.50"), Some(dec!(1200.50)));
        assert_eq!(amount_value("Rs. 500"), Some(dec!(500)));
        assert_eq!(amount_value("300 dollars"), Some(dec!(300)));
        assert_eq!(amount_value("USD"), None);
    }
}
