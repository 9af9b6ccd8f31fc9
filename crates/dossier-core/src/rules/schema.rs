use serde::{Deserialize, Serialize};

/// An ordered table of text rewrite rules applied during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationRuleSet {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Applied top to bottom; later rules see the output of earlier ones.
    pub rules: Vec<RewriteRuleDef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleClass {
    /// Whole-word OCR misrecognitions.
    Misread,
    /// Misspellings and dropped apostrophes.
    Spelling,
    /// Character-substitution noise.
    #[default]
    Artifact,
}

/// A single pattern -> replacement rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteRuleDef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: RuleClass,
    /// Regular expression (Rust `regex` syntax).
    pub pattern: String,
    /// Replacement text; `${1}` refers to capture groups.
    pub replacement: String,
    #[serde(default)]
    pub case_insensitive: bool,
    /// Skip matches that touch numeric punctuation (`3.5`, `5/6`, `$5`).
    #[serde(default)]
    pub standalone: bool,
    #[serde(default)]
    pub note: Option<String>,
}

impl RewriteRuleDef {
    /// Identifier for diagnostics: the id, or the pattern when no id is set.
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.pattern)
    }
}
