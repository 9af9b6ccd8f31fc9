use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DossierError {
    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("tesseract not found. Install it: brew install tesseract (macOS) or apt install tesseract-ocr (Linux)")]
    TesseractNotFound,

    #[error("tesseract failed with exit code {code}: {stderr}")]
    TesseractFailed { code: i32, stderr: String },

    #[error("OCR did not finish within {seconds:.1}s")]
    OcrTimeout { seconds: f64 },

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to load rule set from {path}: {reason}")]
    RulesetLoad { path: PathBuf, reason: String },

    #[error("invalid rule set: {0}")]
    RulesetInvalid(String),

    #[error("invalid pattern for {name}: {reason}")]
    Pattern { name: String, reason: String },

    #[error("language model request failed: {0}")]
    Llm(String),

    #[error("could not parse language model response: {0}")]
    LlmParse(String),

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
