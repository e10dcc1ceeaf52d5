//! Domain types shared by the walker, extractors, aggregator and reports.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Placeholder label for documents no keyword matched.
pub const FALLBACK_CATEGORY: &str = "Allgemein";

/// Closed set of formats the pipeline knows how to turn into text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    PlainText,
    Pdf,
    Word,
    Image,
    Spreadsheet,
    Presentation,
}

impl FileKind {
    /// Map a lowercased extension (without dot) to its kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let kind = match ext {
            "txt" | "md" | "markdown" | "rst" | "html" | "htm" | "json" | "xml" | "csv" | "log" => Self::PlainText,
            "pdf" => Self::Pdf,
            "docx" | "doc" | "odt" | "rtf" => Self::Word,
            "jpg" | "jpeg" | "png" | "bmp" | "tiff" | "tif" => Self::Image,
            "xlsx" | "xls" | "ods" => Self::Spreadsheet,
            "pptx" | "ppt" | "odp" => Self::Presentation,
            _ => return None,
        };
        Some(kind)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(&extension_of(path))
    }
}

/// Lowercased extension without the dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// One successfully processed file.
///
/// Counts are always computed from the exact extracted text; a record never
/// exists for a file whose extraction produced nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentRecord {
    pub path: String,
    pub size: u64,
    pub words: usize,
    pub chars: usize,
    pub lines: usize,
    pub modified: NaiveDateTime,
    pub category: String,
    pub topics: BTreeSet<String>,
    #[serde(default)]
    pub category_mentions: BTreeMap<String, usize>,
    pub preview: String,
    pub extension: String,
    pub kind: FileKind,
    pub content_hash: String,
}

/// Inputs for [`DocumentRecord::from_text`] that do not come from the text.
#[derive(Debug, Clone)]
pub struct RecordSource {
    pub path: String,
    pub size: u64,
    pub modified: NaiveDateTime,
    pub extension: String,
    pub kind: FileKind,
}

impl DocumentRecord {
    pub fn from_text(
        source: RecordSource,
        text: &str,
        category: String,
        topics: BTreeSet<String>,
        category_mentions: BTreeMap<String, usize>,
        preview_chars: usize,
    ) -> Self {
        Self {
            path: source.path,
            size: source.size,
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
            lines: text.matches('\n').count() + 1,
            modified: source.modified,
            category,
            topics,
            category_mentions,
            preview: preview(text, preview_chars),
            extension: source.extension,
            kind: source.kind,
            content_hash: blake3::hash(text.as_bytes()).to_hex().to_string(),
        }
    }
}

/// First `max_chars` characters of `text`, with `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut iter = text.char_indices();
    match iter.nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Running totals for one category label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub document_count: usize,
    pub total_words: u64,
    pub total_chars: u64,
    pub total_size: u64,
    pub documents: Vec<String>,
    pub topics: BTreeSet<String>,
    pub file_types: BTreeMap<String, usize>,
}

impl CategorySummary {
    pub fn add(&mut self, record: &DocumentRecord) {
        self.document_count += 1;
        self.total_words += record.words as u64;
        self.total_chars += record.chars as u64;
        self.total_size += record.size;
        self.documents.push(record.path.clone());
        self.topics.extend(record.topics.iter().cloned());
        *self.file_types.entry(record.extension.clone()).or_insert(0) += 1;
    }

    pub fn total_size_mb(&self) -> f64 { round2(bytes_to_mb(self.total_size)) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    pub generated_at: NaiveDateTime,
    pub source_root: String,
    pub scan_mode: String,
    pub total_documents: usize,
    pub total_categories: usize,
    pub total_words: u64,
    pub total_chars: u64,
    pub total_size: u64,
    pub total_size_mb: f64,
    pub avg_words_per_doc: f64,
    pub file_types: BTreeMap<String, usize>,
    pub category_mentions: BTreeMap<String, usize>,
    pub failed_files: usize,
    pub complete: bool,
}

/// Snapshot written at the end of a scan session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    pub metadata: ReportMetadata,
    pub categories: BTreeMap<String, CategorySummary>,
    pub documents: Vec<DocumentRecord>,
}

pub fn bytes_to_mb(bytes: u64) -> f64 { bytes as f64 / (1024.0 * 1024.0) }

pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> RecordSource {
        RecordSource {
            path: "a/b.txt".into(),
            size: 42,
            modified: NaiveDateTime::default(),
            extension: ".txt".into(),
            kind: FileKind::PlainText,
        }
    }

    #[test]
    fn counts_come_from_text() {
        let rec = DocumentRecord::from_text(source(), "eins zwei\ndrei", "X".into(), BTreeSet::new(), BTreeMap::new(), 500);
        assert_eq!(rec.words, 3);
        assert_eq!(rec.chars, 14);
        assert_eq!(rec.lines, 2);
        assert_eq!(rec.preview, "eins zwei\ndrei");
    }

    #[test]
    fn preview_is_char_bounded() {
        assert_eq!(preview("äöüß", 2), "äö...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn kind_dispatch_is_closed() {
        assert_eq!(FileKind::from_extension("pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_extension("tif"), Some(FileKind::Image));
        assert_eq!(FileKind::from_extension("odp"), Some(FileKind::Presentation));
        assert_eq!(FileKind::from_extension("exe"), None);
        assert_eq!(FileKind::from_path(Path::new("X/Report.DOCX")), Some(FileKind::Word));
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(bytes_to_mb(1024 * 1024 * 3)), 3.0);
    }
}
