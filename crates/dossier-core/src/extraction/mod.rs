pub mod grid;
pub mod handwriting;
pub mod pdftotext;
pub mod process;
pub mod tesseract;

use crate::error::DossierError;
use crate::model::OcrResult;
use std::path::Path;

/// Rough visual style of a page, used to pick recognition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Printed,
    Handwritten,
}

/// Engine settings for one recognition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionParams {
    /// Tesseract page segmentation mode (0..=13).
    pub page_segmentation: u8,
    pub preserve_interword_spaces: bool,
}

impl RecognitionParams {
    /// Single uniform block of text.
    pub const PRINTED: RecognitionParams = RecognitionParams {
        page_segmentation: 6,
        preserve_interword_spaces: true,
    };

    /// Raw line, no layout analysis.
    pub const HANDWRITTEN: RecognitionParams = RecognitionParams {
        page_segmentation: 13,
        preserve_interword_spaces: true,
    };

    pub fn for_style(style: TextStyle) -> Self {
        match style {
            TextStyle::Printed => Self::PRINTED,
            TextStyle::Handwritten => Self::HANDWRITTEN,
        }
    }

    /// Fully automatic segmentation, used for the retry after a failed attempt.
    pub fn fallback() -> Self {
        RecognitionParams {
            page_segmentation: 3,
            preserve_interword_spaces: true,
        }
    }
}

/// A recognition session. Dropping the worker releases its resources.
pub trait OcrWorker {
    fn set_params(&mut self, params: &RecognitionParams) -> Result<(), DossierError>;

    /// Recognize an image. Word boxes are optional; an empty `words` list is
    /// filled in by the caller.
    fn recognize(&mut self, image: &Path) -> Result<OcrResult, DossierError>;
}

/// Trait for OCR backends.
pub trait OcrEngine: Send + Sync {
    fn worker(&self) -> Result<Box<dyn OcrWorker + '_>, DossierError>;

    /// Name of this OCR backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Trait for PDF text extraction backends.
pub trait PdfTextExtractor: Send + Sync {
    /// Extract the plain text of every page.
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, DossierError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Estimates how hard a page will be to read.
pub trait DifficultyClassifier: Send + Sync {
    fn classify(&self, path: &Path) -> TextStyle;
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_any_case() {
        assert!(is_pdf(Path::new("report.PDF")));
        assert!(is_pdf(Path::new("/tmp/a.pdf")));
        assert!(!is_pdf(Path::new("scan.png")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[test]
    fn test_params_for_style() {
        assert_eq!(
            RecognitionParams::for_style(TextStyle::Printed).page_segmentation,
            6
        );
        assert_eq!(
            RecognitionParams::for_style(TextStyle::Handwritten).page_segmentation,
            13
        );
        assert_eq!(RecognitionParams::fallback().page_segmentation, 3);
    }
}
