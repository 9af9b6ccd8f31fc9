use crate::error::DossierError;
use crate::rules::schema::NormalizationRuleSet;

const EN_OCR_JSON: &str = include_str!("../../../../rules/en-ocr.json");
const EN_PRINTED_JSON: &str = include_str!("../../../../rules/en-printed.json");

/// Available predefined normalization rule sets.
pub const PRESETS: &[&str] = &["en-ocr", "en-printed"];

/// Preset used when nothing else is configured.
pub const DEFAULT_PRESET: &str = "en-ocr";

/// Load a predefined rule set by name.
pub fn load_preset(name: &str) -> Result<NormalizationRuleSet, DossierError> {
    let json = match name {
        "en-ocr" => EN_OCR_JSON,
        "en-printed" => EN_PRINTED_JSON,
        _ => {
            return Err(DossierError::RulesetInvalid(format!(
                "unknown preset '{}'. Available: {}",
                name,
                PRESETS.join(", ")
            )))
        }
    };
    let ruleset: NormalizationRuleSet = serde_json::from_str(json)?;
    Ok(ruleset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::schema::RuleClass;
    use crate::rules::validate_ruleset;

    #[test]
    fn test_load_en_ocr_preset() {
        let rs = load_preset("en-ocr").unwrap();
        assert!(rs.rules.iter().any(|r| r.class == RuleClass::Misread));
        assert!(rs.rules.iter().any(|r| r.class == RuleClass::Spelling));
        assert!(rs.rules.iter().any(|r| r.class == RuleClass::Artifact));
    }

    #[test]
    fn test_every_preset_validates() {
        for name in PRESETS {
            let rs = load_preset(name).unwrap();
            validate_ruleset(&rs).unwrap();
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_preset("xyz").is_err());
    }
}
