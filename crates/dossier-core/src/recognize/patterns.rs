//! Compiled patterns for the built-in matchers.
//!
//! Multi-word patterns separate words with a literal space so that no
//! entity spans a line break of the normalized text.

use regex::Regex;
use std::sync::LazyLock;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

pub static PERSON: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b[A-Z][a-z]+ (?:[A-Z][a-z]+ )?[A-Z][a-z]+\b"));

pub const ORG_SUFFIXES: &[&str] = &[
    "Inc",
    "Corp",
    "LLC",
    "Ltd",
    "Co",
    "Company",
    "Group",
    "Association",
    "Organization",
    "Foundation",
];

pub static ORGANIZATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"\b[A-Z][A-Za-z&]*(?: (?:[A-Z][A-Za-z&]*|&))* (?:{})\b",
        ORG_SUFFIXES.join("|")
    ))
});

pub const PLACE_INDICATORS: &[&str] = &[
    "Street",
    "Avenue",
    "Road",
    "Boulevard",
    "Lane",
    "Drive",
    "Court",
    "Plaza",
    "Square",
    "Highway",
    "Bridge",
    "Park",
    "City",
    "Town",
    "Village",
    "State",
    "County",
];

pub static CAPITALIZED_WORD: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Z][a-z]+$"));

pub static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:\+\d{1,3}[- ]?)?(?:\(\d{3}\)|\d{3})[- ]?\d{3}[- ]?\d{4}\b")
});

pub static DATE: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?i)\b(?:\d{1,2}[-/ ]\d{1,2}[-/ ]\d{2,4}",
        r"|(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?",
        r"|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?) +\d{1,2},? +\d{4})\b"
    ))
});

pub static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"));

pub static URL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"https?://(?:www\.)?[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}(?:/\S*)?")
});

pub static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?:\$|€|£|₹|\b[Rr]s\.?) ?\d[\d,]*(?:\.\d{1,2})?",
        r"|\b\d[\d,]*(?:\.\d{1,2})? ?(?:(?i:dollars|usd|eur|rupees|inr)\b|€)"
    ))
});

pub static VEHICLE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b[A-Z]{2} ?\d{1,2} ?[A-Z]{1,3} ?\d{4}\b"));

pub static CASE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:FIR|Case) *(?:No\.?|Number)? *:? *\d+[-/]\d+(?:/\d+)?\b")
});

pub static SUSPECT: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r#"(?i:\b(?:suspect|accused|assailant)) "#,
        r#"(?:(?i:named|identified as|known as) )?"#,
        r#""?([A-Z][a-z]+(?: [A-Z][a-z]+)*)"?"#
    ))
});

pub static ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r#""([A-Za-z]+)"|'([A-Za-z]+)'"#,
        r"|\b(?i:as) ([A-Z][A-Za-z]*)\b|\b(?i:alias) ([A-Z][A-Za-z]*)\b"
    ))
});

pub static WITNESS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:witness|Witness|Mr\.|Mrs\.|Ms\.|Dr\.) ([A-Z][a-z]+(?: [A-Z][a-z]+)*)")
});

pub static TWO_CAPITALIZED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b"));

pub static ONE_CAPITALIZED: LazyLock<Regex> = LazyLock::new(|| compile(r"\b[A-Z][a-z]+\b"));

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(re: &Regex, s: &'a str) -> Option<&'a str> {
        re.find(s).map(|m| m.as_str())
    }

    #[test]
    fn test_phone_formats() {
        assert_eq!(first(&PHONE, "Contact: 555-123-4567"), Some("555-123-4567"));
        assert_eq!(first(&PHONE, "call (555) 123 4567"), Some("(555) 123 4567"));
        assert_eq!(first(&PHONE, "room 1234"), None);
        assert_eq!(first(&PHONE, "call (555)123-4567"), Some("(555)123-4567"));
        assert_eq!(first(&PHONE, "+91 555 123 4567"), Some("+91 555 123 4567"));
    }

    #[test]
    fn test_dates() {
        assert_eq!(first(&DATE, "on 12/05/2023 at"), Some("12/05/2023"));
        assert_eq!(first(&DATE, "on March 3, 2024."), Some("March 3, 2024"));
        assert_eq!(first(&DATE, "on sept 3 2024"), Some("sept 3 2024"));
        assert_eq!(first(&DATE, "555-123-4567"), None);
    }

    #[test]
    fn test_amounts() {
        assert_eq!(first(&AMOUNT, "paid $1,200.50 cash"), Some("$1,200.50"));
        assert_eq!(first(&AMOUNT, "fine of Rs. 5000"), Some("Rs. 5000"));
        assert_eq!(first(&AMOUNT, "about 300 dollars"), Some("300 dollars"));
        assert_eq!(first(&AMOUNT, "cost 40€"), Some("40€"));
        assert_eq!(first(&AMOUNT, "room 300"), None);
    }

    #[test]
    fn test_urls_and_emails() {
        assert_eq!(
            first(&URL, "see https://www.example.org/a/b."),
            Some("https://www.example.org/a/b.")
        );
        assert_eq!(first(&EMAIL, "mail j.doe@police.gov.in now"), Some("j.doe@police.gov.in"));
    }

    #[test]
    fn test_vehicle_and_case() {
        assert_eq!(first(&VEHICLE, "car MH 12 AB 1234 seen"), Some("MH 12 AB 1234"));
        assert_eq!(first(&VEHICLE, "car MH12AB1234 seen"), Some("MH12AB1234"));
        assert_eq!(first(&CASE_NUMBER, "Case No: 44/2023"), Some("Case No: 44/2023"));
        assert_eq!(first(&CASE_NUMBER, "fir number 12-2021/3"), Some("fir number 12-2021/3"));
    }

    #[test]
    fn test_organizations() {
        let found: Vec<&str> = ORGANIZATION
            .find_iter("Paid Acme Widgets Inc and Smith & Sons Co today")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, ["Paid Acme Widgets Inc", "Smith & Sons Co"]);
    }
}
