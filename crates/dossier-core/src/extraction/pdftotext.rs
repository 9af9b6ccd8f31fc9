use crate::config::ExtractionConfig;
use crate::error::DossierError;
use crate::extraction::process::wait_with_timeout;
use crate::extraction::PdfTextExtractor;
use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Returns plain text only; word positions are synthesized by the caller.
#[derive(Debug, Clone)]
pub struct PdftotextExtractor {
    bin: PathBuf,
    timeout: Duration,
}

impl PdftotextExtractor {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        PdftotextExtractor {
            bin: bin.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(&config.pdftotext_bin, config.ocr_timeout())
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available(&self) -> bool {
        Command::new(&self.bin)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl PdfTextExtractor for PdftotextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, DossierError> {
        let dir = tempfile::Builder::new().prefix("dossier-pdf-").tempdir()?;
        let input = dir.path().join("input.pdf");
        let output = dir.path().join("output.txt");
        let stderr_path = dir.path().join("stderr.log");
        std::fs::write(&input, pdf_bytes)?;

        let mut child = Command::new(&self.bin)
            .arg("-enc")
            .arg("UTF-8")
            .arg(&input)
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(File::create(&stderr_path)?))
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DossierError::PdftotextNotFound
                } else {
                    DossierError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        let status = wait_with_timeout(&mut child, self.timeout)?.ok_or_else(|| {
            DossierError::Extraction(format!(
                "pdftotext timed out after {:.1}s",
                self.timeout.as_secs_f64()
            ))
        })?;

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            let stderr = std::fs::read_to_string(&stderr_path).unwrap_or_default();
            return Err(DossierError::PdftotextFailed { code, stderr });
        }

        let bytes = std::fs::read(&output)?;
        // Form feeds separate pages.
        Ok(String::from_utf8_lossy(&bytes).replace('\x0c', "\n"))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary() {
        let ex = PdftotextExtractor::new("/nonexistent/pdftotext", Duration::from_secs(1));
        assert!(!ex.is_available());
        let err = ex.extract_text(b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, DossierError::PdftotextNotFound));
    }
}
