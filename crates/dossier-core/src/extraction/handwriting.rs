use crate::config::DEFAULT_HANDWRITING_HINTS;
use crate::extraction::{is_pdf, DifficultyClassifier, TextStyle};
use std::path::Path;

/// Guesses handwriting from words in the file name (`letter`, `note`, ...).
/// PDFs are always treated as printed.
#[derive(Debug, Clone)]
pub struct FilenameHeuristic {
    hints: Vec<String>,
}

impl FilenameHeuristic {
    pub fn new(hints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        FilenameHeuristic {
            hints: hints
                .into_iter()
                .map(|h| h.into().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }
}

impl Default for FilenameHeuristic {
    fn default() -> Self {
        FilenameHeuristic::new(DEFAULT_HANDWRITING_HINTS.iter().copied())
    }
}

impl DifficultyClassifier for FilenameHeuristic {
    fn classify(&self, path: &Path) -> TextStyle {
        if is_pdf(path) {
            return TextStyle::Printed;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if self.hints.iter().any(|h| name.contains(h.as_str())) {
            TextStyle::Handwritten
        } else {
            TextStyle::Printed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints_in_file_name() {
        let c = FilenameHeuristic::default();
        assert_eq!(c.classify(Path::new("/scans/Letter_2023.png")), TextStyle::Handwritten);
        assert_eq!(c.classify(Path::new("field-notes.jpg")), TextStyle::Handwritten);
        assert_eq!(c.classify(Path::new("receipt.png")), TextStyle::Printed);
    }

    #[test]
    fn test_pdf_is_printed() {
        let c = FilenameHeuristic::default();
        assert_eq!(c.classify(Path::new("handwritten.pdf")), TextStyle::Printed);
    }

    #[test]
    fn test_directory_names_ignored() {
        let c = FilenameHeuristic::default();
        assert_eq!(c.classify(Path::new("/notes/scan.png")), TextStyle::Printed);
    }

    #[test]
    fn test_custom_hints() {
        let c = FilenameHeuristic::new(["diary"]);
        assert_eq!(c.classify(Path::new("Diary-p1.png")), TextStyle::Handwritten);
        assert_eq!(c.classify(Path::new("letter.png")), TextStyle::Printed);
    }
}
