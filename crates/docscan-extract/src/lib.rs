//! docscan-extract
//!
//! Format-specific text extraction. Dispatch is over the closed
//! [`FileKind`] set; each kind has exactly one extraction routine.
//!
//! ## Supported formats
//! - Plain text: UTF-8 with a Latin-1 fallback
//! - PDF: per-page text via lopdf
//! - Word: `.docx` body text via docx-rs
//! - Images: greyscale + contrast + sharpness, then the `tesseract` CLI
//! - Spreadsheets / presentations: fixed placeholder text
//!
//! [`archive`] unpacks zip bundles before a scan.
use std::path::Path;

use tracing::debug;

use docscan_core::config::OcrSettings;
use docscan_core::error::{Error, Result};
use docscan_core::traits::TextExtractor;
pub use docscan_core::types::FileKind;

pub mod archive;
pub mod ocr;
pub mod pdf;
pub mod placeholder;
pub mod plain;
pub mod word;

pub use crate::ocr::OcrEngine;

/// The default extractor set used by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Extractors {
    ocr: OcrEngine,
}

impl Extractors {
    pub fn new(ocr: OcrSettings) -> Self { Self { ocr: OcrEngine::new(ocr) } }

    pub fn extract_kind(&self, kind: FileKind, path: &Path) -> Result<String> {
        debug!("Extracting {:?} from {}", kind, path.display());
        match kind {
            FileKind::PlainText => plain::extract(path),
            FileKind::Pdf => pdf::extract(path),
            FileKind::Word => word::extract(path),
            FileKind::Image => self.ocr.extract(path),
            FileKind::Spreadsheet | FileKind::Presentation => Ok(placeholder::text_for(kind, path)),
        }
    }
}

impl TextExtractor for Extractors {
    fn extract(&self, path: &Path) -> Result<String> {
        match FileKind::from_path(path) {
            Some(kind) => self.extract_kind(kind, path),
            None => Err(Error::extraction(path, "unsupported file type")),
        }
    }
}

/// Trim every line and drop the empty ones.
pub(crate) fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
