use crate::config::ExtractionConfig;
use crate::error::DossierError;
use crate::extraction::process::wait_with_timeout;
use crate::extraction::{OcrEngine, OcrWorker, RecognitionParams};
use crate::model::{BBox, OcrResult, Word};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// OCR backend using the `tesseract` CLI.
///
/// Each recognition writes `txt` and `tsv` output into the worker's private
/// directory; the TSV supplies word boxes and confidences.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    bin: PathBuf,
    language: String,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(bin: impl Into<PathBuf>, language: impl Into<String>, timeout: Duration) -> Self {
        TesseractEngine {
            bin: bin.into(),
            language: language.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(
            &config.tesseract_bin,
            &config.language,
            config.ocr_timeout(),
        )
    }

    /// Check if the configured tesseract binary runs.
    pub fn is_available(&self) -> bool {
        Command::new(&self.bin)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl OcrEngine for TesseractEngine {
    fn worker(&self) -> Result<Box<dyn OcrWorker + '_>, DossierError> {
        let dir = tempfile::Builder::new().prefix("dossier-ocr-").tempdir()?;
        Ok(Box::new(TesseractWorker {
            engine: self,
            dir,
            params: RecognitionParams::PRINTED,
        }))
    }

    fn backend_name(&self) -> &str {
        "tesseract"
    }
}

/// One recognition session. Its scratch directory is removed on drop.
pub struct TesseractWorker<'a> {
    engine: &'a TesseractEngine,
    dir: tempfile::TempDir,
    params: RecognitionParams,
}

impl OcrWorker for TesseractWorker<'_> {
    fn set_params(&mut self, params: &RecognitionParams) -> Result<(), DossierError> {
        if params.page_segmentation > 13 {
            return Err(DossierError::Extraction(format!(
                "invalid page segmentation mode {}",
                params.page_segmentation
            )));
        }
        self.params = *params;
        Ok(())
    }

    fn recognize(&mut self, image: &Path) -> Result<OcrResult, DossierError> {
        let out_base = self.dir.path().join("out");
        let stderr_path = self.dir.path().join("stderr.log");

        let mut cmd = Command::new(&self.engine.bin);
        cmd.arg(image)
            .arg(&out_base)
            .arg("-l")
            .arg(&self.engine.language)
            .arg("--psm")
            .arg(self.params.page_segmentation.to_string());
        if self.params.preserve_interword_spaces {
            cmd.arg("-c").arg("preserve_interword_spaces=1");
        }
        cmd.arg("txt")
            .arg("tsv")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(File::create(&stderr_path)?));

        tracing::debug!(
            image = %image.display(),
            psm = self.params.page_segmentation,
            "running tesseract"
        );
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DossierError::TesseractNotFound
            } else {
                DossierError::Extraction(format!("tesseract failed to start: {}", e))
            }
        })?;

        let status = wait_with_timeout(&mut child, self.engine.timeout)?.ok_or(
            DossierError::OcrTimeout {
                seconds: self.engine.timeout.as_secs_f64(),
            },
        )?;

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            let stderr = std::fs::read_to_string(&stderr_path).unwrap_or_default();
            return Err(DossierError::TesseractFailed { code, stderr });
        }

        let text = std::fs::read_to_string(out_base.with_extension("txt"))?;
        let tsv = std::fs::read_to_string(out_base.with_extension("tsv")).unwrap_or_default();
        Ok(OcrResult::new(text, parse_tsv(&tsv)))
    }
}

/// Word rows (level 5) of tesseract's TSV output. Rows with confidence -1
/// or blank text are skipped; confidences are rescaled from 0..100 to 0..1.
pub fn parse_tsv(tsv: &str) -> Vec<Word> {
    let mut words = Vec::new();
    for line in tsv.lines().skip(1) {
        let cols: Vec<&str> = line.splitn(12, '\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }
        let text = cols[11].trim();
        if text.is_empty() {
            continue;
        }
        let nums: Option<Vec<f32>> = cols[6..=10].iter().map(|c| c.trim().parse().ok()).collect();
        let Some(&[left, top, width, height, conf]) = nums.as_deref() else {
            continue;
        };
        if conf < 0.0 {
            continue;
        }
        words.push(Word::new(
            text,
            conf / 100.0,
            BBox::new(left, top, left + width, top + height),
        ));
    }
    words
}
