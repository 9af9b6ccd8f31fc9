use crate::error::DossierError;
use crate::rules::builtin;
use crate::rules::schema::NormalizationRuleSet;
use crate::rules::validate_ruleset;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Upper bound on repeated passes in [`TextNormalizer::normalize`].
const MAX_PASSES: usize = 8;

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));
static SPACE_AROUND_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" *\n *").expect("valid regex"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static DEFAULT: LazyLock<TextNormalizer> = LazyLock::new(|| {
    let ruleset = builtin::load_preset(builtin::DEFAULT_PRESET).expect("embedded preset parses");
    TextNormalizer::new(&ruleset).expect("embedded preset compiles")
});

/// The normalizer built from the `en-ocr` preset.
pub fn default_normalizer() -> &'static TextNormalizer {
    &DEFAULT
}

#[derive(Debug, Clone)]
struct CompiledRule {
    label: String,
    regex: Regex,
    replacement: String,
    standalone: bool,
}

/// Rewrites raw OCR/PDF text into a cleaner form using an ordered rule table.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    name: String,
    rules: Vec<CompiledRule>,
}

impl TextNormalizer {
    pub fn new(ruleset: &NormalizationRuleSet) -> Result<Self, DossierError> {
        validate_ruleset(ruleset)?;
        let mut rules = Vec::with_capacity(ruleset.rules.len());
        for def in &ruleset.rules {
            let regex = RegexBuilder::new(&def.pattern)
                .case_insensitive(def.case_insensitive)
                .build()
                .map_err(|e| DossierError::Pattern {
                    name: def.label().to_string(),
                    reason: e.to_string(),
                })?;
            rules.push(CompiledRule {
                label: def.label().to_string(),
                regex,
                replacement: def.replacement.clone(),
                standalone: def.standalone,
            });
        }
        Ok(TextNormalizer {
            name: ruleset.name.clone(),
            rules,
        })
    }

    pub fn from_preset(name: &str) -> Result<Self, DossierError> {
        let ruleset = builtin::load_preset(name)?;
        Self::new(&ruleset)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Normalize `text`, repeating the cleanup pass until the output is stable.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.pass(text);
        for _ in 1..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn pass(&self, text: &str) -> String {
        let mut s = text.replace("\r\n", "\n").replace('\r', "\n").replace('\t', " ");
        s = collapse_repeated_letters(&s);

        for rule in &self.rules {
            let rewritten = if rule.standalone {
                replace_standalone(&rule.regex, &rule.replacement, &s)
            } else {
                rule.regex
                    .replace_all(&s, rule.replacement.as_str())
                    .into_owned()
            };
            if rewritten != s {
                tracing::trace!(rule = %rule.label, "normalization rule applied");
                s = rewritten;
            }
        }

        let s = HORIZONTAL_WS.replace_all(&s, " ");
        let s = SPACE_AROUND_NEWLINE.replace_all(&s, "\n");
        let s = EXCESS_NEWLINES.replace_all(&s, "\n\n");
        join_broken_lines(s.trim())
    }
}

/// Punctuation that makes a neighbouring digit part of a number, date or amount.
fn is_numeric_punct(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | '/' | ':' | '-' | '$' | '%' | '+' | '#' | '€' | '£' | '₹'
    )
}

/// Currency words that may stand apart from the number they qualify.
const CURRENCY_WORDS: &[&str] = &["rs", "rs.", "inr", "usd", "eur", "dollars", "rupees"];

/// A token made only of digits and numeric punctuation, or a currency word.
fn is_numeric_token(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    token
        .chars()
        .all(|c| c.is_ascii_digit() || is_numeric_punct(c))
        || CURRENCY_WORDS.contains(&token.to_lowercase().as_str())
}

fn is_upper_run(token: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&token.len()) && token.chars().all(|c| c.is_ascii_uppercase())
}

/// Nearest token on the same line before `before`'s end.
fn prev_token(before: &str) -> &str {
    let trimmed = before.trim_end_matches([' ', '\t']);
    trimmed.rsplit(char::is_whitespace).next().unwrap_or("")
}

/// Nearest token on the same line after `after`'s start.
fn next_token(after: &str) -> &str {
    let trimmed = after.trim_start_matches([' ', '\t']);
    trimmed.split(char::is_whitespace).next().unwrap_or("")
}

/// Whether a standalone match sits inside a number, date, amount or plate.
fn in_numeric_context(before: &str, after: &str) -> bool {
    let touches = before.chars().next_back().is_some_and(is_numeric_punct)
        || after.chars().next().is_some_and(is_numeric_punct);
    if touches {
        return true;
    }
    let prev = prev_token(before);
    let next = next_token(after);
    is_numeric_token(prev)
        || is_numeric_token(next)
        || (is_upper_run(prev, 2..=2) && is_upper_run(next, 1..=3))
}

/// Like `replace_all`, but leaves matches that belong to a number untouched:
/// touching numeric punctuation, next to a numeric or currency token, or
/// between the letter groups of a registration plate.
fn replace_standalone(re: &Regex, replacement: &str, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if in_numeric_context(&text[..m.start()], &text[m.end()..]) {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        caps.expand(replacement, &mut out);
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// `aaa` -> `aa`; runs compare ASCII letters case-insensitively.
fn collapse_repeated_letters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run: Option<char> = None;
    let mut run_len = 0usize;
    for c in text.chars() {
        if c.is_ascii_alphabetic() && run.is_some_and(|r| r.eq_ignore_ascii_case(&c)) {
            run_len += 1;
        } else {
            run = c.is_ascii_alphabetic().then_some(c);
            run_len = 1;
        }
        if run_len <= 2 {
            out.push(c);
        }
    }
    out
}

/// Replace a newline between two lowercase letters with a space.
fn join_broken_lines(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let joins = c == '\n'
            && i > 0
            && chars[i - 1].is_ascii_lowercase()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
        out.push(if joins { ' ' } else { c });
    }
    out
}
