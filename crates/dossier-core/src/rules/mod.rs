pub mod builtin;
pub mod schema;

use crate::error::DossierError;
use regex::RegexBuilder;
use schema::NormalizationRuleSet;
use std::collections::HashSet;
use std::path::Path;

/// Load a normalization rule set from a JSON file.
pub fn load_ruleset(path: &Path) -> Result<NormalizationRuleSet, DossierError> {
    let content = std::fs::read_to_string(path).map_err(|e| DossierError::RulesetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_ruleset(&content, path)
}

/// Parse a rule set from a JSON string.
pub fn parse_ruleset(json: &str, source: &Path) -> Result<NormalizationRuleSet, DossierError> {
    let ruleset: NormalizationRuleSet =
        serde_json::from_str(json).map_err(|e| DossierError::RulesetLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Parse a rule set from a JSON string (no file path context).
pub fn parse_ruleset_str(json: &str) -> Result<NormalizationRuleSet, DossierError> {
    let ruleset: NormalizationRuleSet = serde_json::from_str(json).map_err(DossierError::Json)?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Validate that a rule set is well-formed and every pattern compiles.
pub fn validate_ruleset(ruleset: &NormalizationRuleSet) -> Result<(), DossierError> {
    if ruleset.rules.is_empty() {
        return Err(DossierError::RulesetInvalid("rules must not be empty".into()));
    }

    let mut seen_ids = HashSet::new();
    for rule in &ruleset.rules {
        if rule.pattern.is_empty() {
            return Err(DossierError::RulesetInvalid(format!(
                "rule '{}' has an empty pattern",
                rule.label()
            )));
        }

        if let Some(ref id) = rule.id {
            if !seen_ids.insert(id.as_str()) {
                return Err(DossierError::RulesetInvalid(format!(
                    "duplicate rule id '{}'",
                    id
                )));
            }
        }

        RegexBuilder::new(&rule.pattern)
            .case_insensitive(rule.case_insensitive)
            .build()
            .map_err(|e| DossierError::Pattern {
                name: rule.label().to_string(),
                reason: e.to_string(),
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ruleset() {
        let json = r#"{
            "name": "Test",
            "version": "1.0",
            "rules": [
                { "id": "teh", "class": "spelling", "pattern": "\\bteh\\b", "replacement": "the" }
            ]
        }"#;
        let rs = parse_ruleset_str(json).unwrap();
        assert_eq!(rs.name, "Test");
        assert_eq!(rs.rules.len(), 1);
        assert!(!rs.rules[0].case_insensitive);
        assert!(!rs.rules[0].standalone);
    }

    #[test]
    fn test_empty_rules_rejected() {
        let json = r#"{ "name": "Bad", "version": "1.0", "rules": [] }"#;
        assert!(parse_ruleset_str(json).is_err());
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rules": [ { "pattern": "(unclosed", "replacement": "x" } ]
        }"#;
        let err = parse_ruleset_str(json).unwrap_err();
        assert!(matches!(err, DossierError::Pattern { .. }));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rules": [
                { "id": "a", "pattern": "x", "replacement": "y" },
                { "id": "a", "pattern": "z", "replacement": "y" }
            ]
        }"#;
        assert!(parse_ruleset_str(json).is_err());
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = load_ruleset(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rules.json"));
    }
}
