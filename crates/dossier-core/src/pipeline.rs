use crate::config::ExtractionConfig;
use crate::error::DossierError;
use crate::extraction::grid::{synthesize_words, GridLayout};
use crate::extraction::handwriting::FilenameHeuristic;
use crate::extraction::pdftotext::PdftotextExtractor;
use crate::extraction::tesseract::TesseractEngine;
use crate::extraction::{
    is_pdf, DifficultyClassifier, OcrEngine, PdfTextExtractor, RecognitionParams, TextStyle,
};
use crate::index::WordIndex;
use crate::model::{
    DocumentExtraction, Entity, EntityCategory, EntitySet, GeometrySource, OcrResult, Word,
};
use crate::normalize::TextNormalizer;
use crate::recognize::token::amount_value;
use crate::recognize::{RecognitionInput, Recognizer};
use crate::resolve::SpanResolver;
use std::path::Path;

/// Recognize, place and deduplicate entities in already-normalized text.
pub fn collect_entities(normalized: &str, words: &[Word], recognizer: &Recognizer) -> EntitySet {
    let index = WordIndex::build(words);
    let recognition = recognizer.recognize(&RecognitionInput {
        text: normalized,
        words,
    });
    let resolver = SpanResolver::new(&index);

    let mut entities = EntitySet::new();
    for (category, candidate) in &recognition.candidates {
        if entities.contains(*category, &candidate.text) {
            continue;
        }
        let placement = resolver.resolve(candidate);
        let value = if *category == EntityCategory::Amounts {
            amount_value(&candidate.text)
        } else {
            None
        };
        entities.insert(
            *category,
            Entity {
                text: candidate.text.clone(),
                confidence: placement.confidence,
                bounding_box: placement.bounding_box,
                estimated: placement.estimated,
                value,
            },
        );
    }

    tracing::debug!(
        candidates = recognition.candidates.len(),
        entities = entities.len(),
        indexed_words = index.len(),
        "entity extraction finished"
    );
    entities
}

/// Text shown in place of OCR output when recognition failed twice.
pub fn failure_placeholder(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    format!(
        "Failed to perform full OCR on {}. File size: {:.2} MB.\n\nPlease try again with a clearer image or use a different document.",
        name,
        size as f64 / 1024.0 / 1024.0
    )
}

/// Runs documents through OCR or PDF extraction and the entity pipeline.
pub struct Extractor {
    engine: Box<dyn OcrEngine>,
    handwriting: Option<Box<dyn OcrEngine>>,
    pdf: Box<dyn PdfTextExtractor>,
    classifier: Box<dyn DifficultyClassifier>,
    normalizer: TextNormalizer,
    recognizer: Recognizer,
    config: ExtractionConfig,
}

impl Extractor {
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::default()
    }

    /// Shipped collaborators configured from `config`.
    pub fn from_config(config: ExtractionConfig) -> Result<Self, DossierError> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    /// Extract text and words from a PDF or image. Never fails: engine errors
    /// produce a placeholder result with `error` set.
    pub fn perform_extraction(&self, path: &Path) -> OcrResult {
        if is_pdf(path) {
            self.extract_pdf(path)
        } else {
            self.extract_image(path)
        }
    }

    pub fn extract_entities(&self, result: &OcrResult) -> EntitySet {
        let normalized = self.normalizer.normalize(&result.text);
        collect_entities(&normalized, &result.words, &self.recognizer)
    }

    pub fn process_document(&self, path: &Path) -> DocumentExtraction {
        let result = self.perform_extraction(path);
        let text = self.normalizer.normalize(&result.text);
        let entities = collect_entities(&text, &result.words, &self.recognizer);
        DocumentExtraction {
            text,
            entities,
            geometry: result.geometry,
            error: result.error,
            condition: result.condition,
        }
    }

    fn extract_pdf(&self, path: &Path) -> OcrResult {
        tracing::info!(
            path = %path.display(),
            backend = self.pdf.backend_name(),
            "extracting PDF text"
        );
        let text = match std::fs::read(path)
            .map_err(DossierError::from)
            .and_then(|bytes| self.pdf.extract_text(&bytes))
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "PDF extraction failed");
                return OcrResult::failed(failure_placeholder(path), e.to_string());
            }
        };
        if text.trim().is_empty() {
            return OcrResult::no_text();
        }
        let words = synthesize_words(&text, &GridLayout::PDF);
        OcrResult {
            text,
            words,
            geometry: GeometrySource::Synthesized,
            error: None,
            condition: None,
        }
    }

    fn extract_image(&self, path: &Path) -> OcrResult {
        let style = self.classifier.classify(path);
        let mut params = RecognitionParams::for_style(style);

        if let (TextStyle::Handwritten, Some(engine)) = (style, self.handwriting.as_deref()) {
            tracing::info!(
                path = %path.display(),
                backend = engine.backend_name(),
                "recognizing handwriting"
            );
            match Self::recognize_with(engine, path, &params) {
                Ok(result) if !result.text.trim().is_empty() => return self.finish_ocr(result),
                Ok(_) => tracing::warn!(
                    backend = engine.backend_name(),
                    "handwriting engine found no text; falling back to primary engine"
                ),
                Err(e) => tracing::warn!(
                    backend = engine.backend_name(),
                    error = %e,
                    "handwriting engine failed; falling back to primary engine"
                ),
            }
            params = RecognitionParams::PRINTED;
        }

        tracing::info!(
            path = %path.display(),
            backend = self.engine.backend_name(),
            ?style,
            "recognizing image"
        );

        let attempt = self.recognize_once(path, &params).or_else(|e| {
            tracing::warn!(error = %e, "OCR attempt failed; retrying with fallback parameters");
            self.recognize_once(path, &RecognitionParams::fallback())
        });

        match attempt {
            Ok(result) => self.finish_ocr(result),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "OCR failed");
                OcrResult::failed(failure_placeholder(path), e.to_string())
            }
        }
    }

    fn recognize_once(
        &self,
        path: &Path,
        params: &RecognitionParams,
    ) -> Result<OcrResult, DossierError> {
        Self::recognize_with(self.engine.as_ref(), path, params)
    }

    fn recognize_with(
        engine: &dyn OcrEngine,
        path: &Path,
        params: &RecognitionParams,
    ) -> Result<OcrResult, DossierError> {
        let mut worker = engine.worker()?;
        if let Err(e) = worker.set_params(params) {
            tracing::warn!(error = %e, "could not set OCR parameters; using engine defaults");
        }
        worker.recognize(path)
    }

    fn finish_ocr(&self, mut result: OcrResult) -> OcrResult {
        if result.text.trim().is_empty() {
            tracing::debug!("OCR recognized no text");
            return OcrResult::no_text();
        }
        result.error = None;
        if result.words.is_empty() {
            let cleaned = self.normalizer.normalize(&result.text);
            result.words = synthesize_words(&cleaned, &GridLayout::OCR);
            result.geometry = GeometrySource::Synthesized;
        } else {
            result.geometry = GeometrySource::Native;
        }
        result
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("engine", &self.engine.backend_name())
            .field(
                "handwriting",
                &self.handwriting.as_ref().map(|e| e.backend_name()),
            )
            .field("pdf", &self.pdf.backend_name())
            .field("normalizer", &self.normalizer.name())
            .field("recognizer", &self.recognizer)
            .finish()
    }
}

/// Builder for [`Extractor`]; unset collaborators come from the config.
#[derive(Default)]
pub struct ExtractorBuilder {
    config: ExtractionConfig,
    engine: Option<Box<dyn OcrEngine>>,
    handwriting: Option<Box<dyn OcrEngine>>,
    pdf: Option<Box<dyn PdfTextExtractor>>,
    classifier: Option<Box<dyn DifficultyClassifier>>,
    normalizer: Option<TextNormalizer>,
    recognizer: Option<Recognizer>,
}

impl ExtractorBuilder {
    pub fn config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ocr_engine(mut self, engine: impl OcrEngine + 'static) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }

    /// Engine tried first for pages classified as handwritten. When it fails
    /// or finds no text, the primary engine runs with printed parameters.
    pub fn handwriting_engine(mut self, engine: impl OcrEngine + 'static) -> Self {
        self.handwriting = Some(Box::new(engine));
        self
    }

    pub fn pdf_extractor(mut self, pdf: impl PdfTextExtractor + 'static) -> Self {
        self.pdf = Some(Box::new(pdf));
        self
    }

    pub fn classifier(mut self, classifier: impl DifficultyClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    pub fn normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn recognizer(mut self, recognizer: Recognizer) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn build(self) -> Result<Extractor, DossierError> {
        let config = self.config;
        let normalizer = match self.normalizer {
            Some(n) => n,
            None => config.normalization.load()?,
        };
        Ok(Extractor {
            engine: self
                .engine
                .unwrap_or_else(|| Box::new(TesseractEngine::from_config(&config))),
            handwriting: self.handwriting,
            pdf: self
                .pdf
                .unwrap_or_else(|| Box::new(PdftotextExtractor::from_config(&config))),
            classifier: self.classifier.unwrap_or_else(|| {
                Box::new(FilenameHeuristic::new(config.handwriting_hints.iter().cloned()))
            }),
            normalizer,
            recognizer: self.recognizer.unwrap_or_default(),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    #[test]
    fn test_collect_entities_dedups_and_parses_amounts() {
        let text = "Paid $1,200 and again $1,200 to Acme Widgets Inc";
        let entities = collect_entities(text, &[], &Recognizer::default());
        let amounts = entities.get(EntityCategory::Amounts);
        assert_eq!(amounts.len(), 1);
        assert_eq!(amounts[0].value, Some(rust_decimal::Decimal::from(1200)));
        assert!(amounts[0].estimated);
        assert_eq!(
            entities.get(EntityCategory::Organizations)[0].text,
            "Acme Widgets Inc"
        );
    }

    #[test]
    fn test_collect_entities_uses_word_boxes() {
        let words = vec![
            Word::new("John", 0.9, BBox::new(10.0, 10.0, 40.0, 20.0)),
            Word::new("Smith", 0.95, BBox::new(42.0, 10.0, 80.0, 20.0)),
        ];
        let entities = collect_entities("John Smith", &words, &Recognizer::default());
        let person = &entities.get(EntityCategory::Persons)[0];
        assert!(!person.estimated);
        assert_eq!(person.bounding_box.width, 70.0);
        assert_eq!(person.confidence, 0.9);
    }

    #[test]
    fn test_failure_placeholder_for_missing_file() {
        let text = failure_placeholder(Path::new("/nonexistent/scan-7.png"));
        assert!(text.starts_with("Failed to perform full OCR on scan-7.png. File size: 0.00 MB."));
        assert!(text.ends_with("use a different document."));
    }

    #[test]
    fn test_from_config_builds() {
        let ex = Extractor::from_config(ExtractionConfig::default()).unwrap();
        assert_eq!(ex.normalizer().name(), "English OCR cleanup");
        assert!(!ex.recognizer().is_empty());
    }
}
