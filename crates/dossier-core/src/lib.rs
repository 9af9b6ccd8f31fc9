pub mod config;
pub mod error;
pub mod extraction;
pub mod index;
pub mod llm;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod recognize;
pub mod resolve;
pub mod rules;

use error::DossierError;
use llm::{ChatModel, TextEntitySet};
use model::{DocumentExtraction, EntitySet, OcrResult};
use pipeline::Extractor;
use recognize::Recognizer;
use std::path::Path;
use std::sync::LazyLock;

static DEFAULT_RECOGNIZER: LazyLock<Recognizer> = LazyLock::new(Recognizer::default);

/// Extract raw text and word positions from an image or PDF.
///
/// Never fails; see [`Extractor::perform_extraction`].
pub fn perform_extraction(path: &Path, extractor: &Extractor) -> OcrResult {
    extractor.perform_extraction(path)
}

/// Main API entry point: typed, deduplicated, positioned entities for an
/// extraction result, using the built-in normalization rules and matchers.
pub fn extract_entities(result: &OcrResult) -> EntitySet {
    let normalized = normalize::default_normalizer().normalize(&result.text);
    pipeline::collect_entities(&normalized, &result.words, &DEFAULT_RECOGNIZER)
}

/// Entities from plain text via a language model, without page geometry.
pub fn extract_entities_from_text(text: &str, model: &dyn ChatModel) -> TextEntitySet {
    llm::extract_entities_from_text(text, model)
}

/// Extraction followed by entity recognition for one document.
pub fn process_document(path: &Path, extractor: &Extractor) -> DocumentExtraction {
    extractor.process_document(path)
}

/// An [`Extractor`] with the shipped collaborators, configured from the environment.
pub fn default_extractor() -> Result<Extractor, DossierError> {
    Extractor::from_config(config::ExtractionConfig::from_env())
}
