//! docscan-report
//!
//! Turns a finished [`Aggregator`] into a [`ScanReport`], serializes it as
//! JSON and as a fixed-width text summary, and manages the report pairs kept
//! in the results directory.
use chrono::NaiveDateTime;

use docscan_core::aggregator::Aggregator;
use docscan_core::error::Result;
use docscan_core::types::{bytes_to_mb, round2, ReportMetadata, ScanReport};

pub mod text;
pub mod writer;

pub use text::{render_text, TextOptions};
pub use writer::{stamp_for, ReportPaths, ReportWriter};

/// Facts about the scan that the aggregate itself does not carry.
#[derive(Debug, Clone)]
pub struct FinalizeContext {
    pub source_root: String,
    pub scan_mode: String,
    pub generated_at: NaiveDateTime,
    pub complete: bool,
}

pub fn finalize(aggregator: Aggregator, ctx: FinalizeContext) -> ScanReport {
    let total_words = aggregator.total_words();
    let total_chars = aggregator.total_chars();
    let total_size = aggregator.total_size();
    let parts = aggregator.into_parts();

    let mut documents = parts.documents;
    documents.sort_by(|a, b| a.path.to_lowercase().cmp(&b.path.to_lowercase()).then_with(|| a.path.cmp(&b.path)));

    let total_documents = documents.len();
    let avg_words_per_doc = if total_documents == 0 { 0.0 } else { round2(total_words as f64 / total_documents as f64) };

    let metadata = ReportMetadata {
        generated_at: ctx.generated_at,
        source_root: ctx.source_root,
        scan_mode: ctx.scan_mode,
        total_documents,
        total_categories: parts.categories.len(),
        total_words,
        total_chars,
        total_size,
        total_size_mb: round2(bytes_to_mb(total_size)),
        avg_words_per_doc,
        file_types: parts.file_types,
        category_mentions: parts.category_mentions,
        failed_files: parts.failed_files,
        complete: ctx.complete,
    };

    ScanReport { metadata, categories: parts.categories, documents }
}

pub fn to_json(report: &ScanReport) -> Result<String> { Ok(serde_json::to_string_pretty(report)?) }

pub fn from_json(json: &str) -> Result<ScanReport> { Ok(serde_json::from_str(json)?) }

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::{BTreeMap, BTreeSet};

    use chrono::{NaiveDate, NaiveDateTime};
    use docscan_core::types::{DocumentRecord, FileKind, RecordSource};

    pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(h, m, s)).unwrap_or_default()
    }

    pub fn record(path: &str, category: &str, text: &str, size: u64) -> DocumentRecord {
        let ext = path.rsplit_once('.').map(|(_, e)| format!(".{}", e)).unwrap_or_default();
        let mut mentions = BTreeMap::new();
        mentions.insert(category.to_string(), 1);
        DocumentRecord::from_text(
            RecordSource {
                path: path.into(),
                size,
                modified: at(9, 30, 0),
                extension: ext,
                kind: FileKind::PlainText,
            },
            text,
            category.into(),
            BTreeSet::from(["Cloud Computing".to_string()]),
            mentions,
            500,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{at, record};
    use super::*;

    fn context() -> FinalizeContext {
        FinalizeContext { source_root: "/data".into(), scan_mode: "office".into(), generated_at: at(12, 0, 0), complete: true }
    }

    #[test]
    fn finalize_sorts_case_insensitively_and_rounds() {
        let agg: Aggregator = vec![
            record("b/zeta.txt", "Design", "one two three", 1000),
            record("A/alpha.txt", "Design", "one two", 2000),
            record("a/beta.txt", "Informatik", "one two three four five six seven eight nine ten", 500),
        ]
        .into_iter()
        .collect();

        let report = finalize(agg, context());
        let paths: Vec<&str> = report.documents.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["A/alpha.txt", "a/beta.txt", "b/zeta.txt"]);
        assert_eq!(report.metadata.total_documents, 3);
        assert_eq!(report.metadata.total_categories, 2);
        assert_eq!(report.metadata.total_words, 15);
        assert_eq!(report.metadata.avg_words_per_doc, 5.0);
        assert_eq!(report.metadata.total_size, 3500);
        assert_eq!(report.metadata.total_size_mb, 0.0);
        assert_eq!(report.metadata.category_mentions.get("Design"), Some(&2));
    }

    #[test]
    fn empty_scan_has_zero_average() {
        let report = finalize(Aggregator::new(), context());
        assert_eq!(report.metadata.total_documents, 0);
        assert_eq!(report.metadata.avg_words_per_doc, 0.0);
        assert!(report.categories.is_empty());
    }

    #[test]
    fn json_round_trip_preserves_report() {
        let agg: Aggregator = vec![record("x.txt", "Recht", "Vertrag und Haftung", 42)].into_iter().collect();
        let mut report = finalize(agg, context());
        report.metadata.failed_files = 2;
        let json = to_json(&report).unwrap();
        assert!(json.contains("\"total_documents\": 1"));
        assert_eq!(from_json(&json).unwrap(), report);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(from_json("{\"metadata\": 3}"), Err(docscan_core::Error::Serialization(_))));
    }
}
