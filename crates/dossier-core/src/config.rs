use crate::error::DossierError;
use crate::normalize::TextNormalizer;
use crate::rules;
use crate::rules::builtin;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OCR_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai";
pub const FALLBACK_LLM_MODEL: &str = "llama-3.1-70b-versatile";

/// File-name fragments that suggest handwritten content.
pub const DEFAULT_HANDWRITING_HINTS: &[&str] =
    &["handwritten", "handwrit", "note", "script", "letter", "journal"];

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read a millisecond timeout, clamped to 50 ms ..= 5 min.
pub fn timeout_from_env_ms(key: &str, default_ms: u64) -> Duration {
    let ms = env(key)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default_ms)
        .clamp(50, 300_000);
    Duration::from_millis(ms)
}

/// Which rule table the text normalizer is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationSource {
    Preset(String),
    File(PathBuf),
}

impl Default for NormalizationSource {
    fn default() -> Self {
        NormalizationSource::Preset(builtin::DEFAULT_PRESET.to_string())
    }
}

impl NormalizationSource {
    pub fn load(&self) -> Result<TextNormalizer, DossierError> {
        match self {
            NormalizationSource::Preset(name) => TextNormalizer::from_preset(name),
            NormalizationSource::File(path) => TextNormalizer::new(&rules::load_ruleset(path)?),
        }
    }
}

/// Settings for the OCR and PDF collaborators and the text normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub tesseract_bin: PathBuf,
    /// Tesseract language code, e.g. `eng` or `eng+hin`.
    pub language: String,
    pub ocr_timeout_ms: u64,
    pub pdftotext_bin: PathBuf,
    pub handwriting_hints: Vec<String>,
    pub normalization: NormalizationSource,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            tesseract_bin: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            ocr_timeout_ms: DEFAULT_OCR_TIMEOUT_MS,
            pdftotext_bin: PathBuf::from("pdftotext"),
            handwriting_hints: DEFAULT_HANDWRITING_HINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            normalization: NormalizationSource::default(),
        }
    }
}

impl ExtractionConfig {
    /// Defaults overridden by `DOSSIER_TESSERACT`, `DOSSIER_OCR_LANG`,
    /// `DOSSIER_OCR_TIMEOUT_MS` and `DOSSIER_PDFTOTEXT`.
    pub fn from_env() -> Self {
        let mut cfg = ExtractionConfig::default();
        if let Some(bin) = env("DOSSIER_TESSERACT") {
            cfg.tesseract_bin = PathBuf::from(bin);
        }
        if let Some(lang) = env("DOSSIER_OCR_LANG") {
            cfg.language = lang;
        }
        cfg.ocr_timeout_ms =
            timeout_from_env_ms("DOSSIER_OCR_TIMEOUT_MS", DEFAULT_OCR_TIMEOUT_MS).as_millis()
                as u64;
        if let Some(bin) = env("DOSSIER_PDFTOTEXT") {
            cfg.pdftotext_bin = PathBuf::from(bin);
        }
        cfg
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_millis(self.ocr_timeout_ms)
    }
}

/// Settings for the OpenAI-compatible chat endpoint used by the text-only entity path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    /// Tried once when `model` is reported missing.
    pub fallback_model: String,
    pub timeout_ms: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: None,
            model: FALLBACK_LLM_MODEL.to_string(),
            fallback_model: FALLBACK_LLM_MODEL.to_string(),
            timeout_ms: 30_000,
            max_tokens: 800,
            temperature: 0.0,
        }
    }
}

impl LlmConfig {
    /// Build from `DOSSIER_LLM_*` variables, falling back to the Groq ones.
    /// Fails when no API key is set.
    pub fn from_env() -> Result<Self, DossierError> {
        let mut cfg = LlmConfig::default();
        if let Some(url) = env("DOSSIER_LLM_BASE_URL") {
            cfg.base_url = url;
        }
        cfg.api_key = env("DOSSIER_LLM_API_KEY").or_else(|| env("GROQ_API_KEY"));
        if cfg.api_key.is_none() {
            return Err(DossierError::NotConfigured(
                "missing DOSSIER_LLM_API_KEY (or GROQ_API_KEY)".to_string(),
            ));
        }
        if let Some(model) = env("DOSSIER_LLM_MODEL")
            .or_else(|| env("GROQ_ENTITY_MODEL"))
            .or_else(|| env("AI_MODEL"))
        {
            cfg.model = model;
        }
        cfg.timeout_ms = timeout_from_env_ms("DOSSIER_LLM_TIMEOUT_MS", cfg.timeout_ms).as_millis()
            as u64;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ExtractionConfig::default();
        assert_eq!(cfg.language, "eng");
        assert_eq!(cfg.ocr_timeout(), Duration::from_secs(30));
        assert!(cfg.handwriting_hints.iter().any(|h| h == "journal"));
        assert_eq!(
            cfg.normalization,
            NormalizationSource::Preset("en-ocr".to_string())
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: ExtractionConfig =
            serde_json::from_str(r#"{ "language": "eng+hin", "ocr_timeout_ms": 5000 }"#).unwrap();
        assert_eq!(cfg.language, "eng+hin");
        assert_eq!(cfg.ocr_timeout_ms, 5000);
        assert_eq!(cfg.tesseract_bin, PathBuf::from("tesseract"));
    }

    #[test]
    fn test_normalization_source_loads_preset() {
        let n = NormalizationSource::Preset("en-printed".into()).load().unwrap();
        assert!(n.rule_count() > 0);
        assert!(NormalizationSource::Preset("nope".into()).load().is_err());
    }

    #[test]
    fn test_llm_api_key_not_serialized() {
        let cfg = LlmConfig {
            api_key: Some("secret".into()),
            ..LlmConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("secret"));
    }
}
