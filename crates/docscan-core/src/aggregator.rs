//! Per-scan accumulation of document records into category summaries.

use std::collections::BTreeMap;

use crate::types::{CategorySummary, DocumentRecord};

/// Aggregate state owned by one scan session.
///
/// Every total is updated as records arrive, so a summary always matches
/// the documents it holds, even if the scan stops early.
#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    categories: BTreeMap<String, CategorySummary>,
    documents: Vec<DocumentRecord>,
    file_types: BTreeMap<String, usize>,
    category_mentions: BTreeMap<String, usize>,
    failed_files: usize,
}

impl Aggregator {
    pub fn new() -> Self { Self::default() }

    pub fn absorb(&mut self, record: DocumentRecord) {
        self.categories.entry(record.category.clone()).or_default().add(&record);
        *self.file_types.entry(record.extension.clone()).or_insert(0) += 1;
        for (label, n) in &record.category_mentions {
            *self.category_mentions.entry(label.clone()).or_insert(0) += n;
        }
        self.documents.push(record);
    }

    /// Count a file whose extraction failed or produced no text.
    pub fn record_failure(&mut self) { self.failed_files += 1; }

    pub fn categories(&self) -> &BTreeMap<String, CategorySummary> { &self.categories }

    pub fn documents(&self) -> &[DocumentRecord] { &self.documents }

    pub fn file_types(&self) -> &BTreeMap<String, usize> { &self.file_types }

    pub fn category_mentions(&self) -> &BTreeMap<String, usize> { &self.category_mentions }

    pub fn failed_files(&self) -> usize { self.failed_files }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn total_words(&self) -> u64 { self.documents.iter().map(|d| d.words as u64).sum() }

    pub fn total_chars(&self) -> u64 { self.documents.iter().map(|d| d.chars as u64).sum() }

    pub fn total_size(&self) -> u64 { self.documents.iter().map(|d| d.size).sum() }

    pub fn into_parts(self) -> AggregateParts {
        AggregateParts {
            categories: self.categories,
            documents: self.documents,
            file_types: self.file_types,
            category_mentions: self.category_mentions,
            failed_files: self.failed_files,
        }
    }
}

/// Owned contents of a finished [`Aggregator`].
#[derive(Debug)]
pub struct AggregateParts {
    pub categories: BTreeMap<String, CategorySummary>,
    pub documents: Vec<DocumentRecord>,
    pub file_types: BTreeMap<String, usize>,
    pub category_mentions: BTreeMap<String, usize>,
    pub failed_files: usize,
}

impl Extend<DocumentRecord> for Aggregator {
    fn extend<I: IntoIterator<Item = DocumentRecord>>(&mut self, iter: I) {
        for record in iter {
            self.absorb(record);
        }
    }
}

impl FromIterator<DocumentRecord> for Aggregator {
    fn from_iter<I: IntoIterator<Item = DocumentRecord>>(iter: I) -> Self {
        let mut agg = Self::new();
        agg.extend(iter);
        agg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileKind, RecordSource};
    use chrono::NaiveDateTime;
    use std::collections::BTreeSet;

    fn record(path: &str, category: &str, text: &str, size: u64, ext: &str) -> DocumentRecord {
        let topics: BTreeSet<String> = if text.contains("cloud") { ["Cloud Computing".to_string()].into() } else { BTreeSet::new() };
        DocumentRecord::from_text(
            RecordSource {
                path: path.into(),
                size,
                modified: NaiveDateTime::default(),
                extension: ext.into(),
                kind: FileKind::PlainText,
            },
            text,
            category.into(),
            topics,
            BTreeMap::new(),
            100,
        )
    }

    #[test]
    fn summary_created_lazily_and_totals_tracked() {
        let mut agg = Aggregator::new();
        assert!(agg.categories().is_empty());
        agg.absorb(record("a.txt", "Design", "one two three", 10, ".txt"));
        agg.absorb(record("b.pdf", "Design", "cloud four", 20, ".pdf"));
        let s = &agg.categories()["Design"];
        assert_eq!(s.document_count, 2);
        assert_eq!(s.total_words, 5);
        assert_eq!(s.total_size, 30);
        assert_eq!(s.documents, vec!["a.txt".to_string(), "b.pdf".to_string()]);
        assert_eq!(s.file_types.get(".txt"), Some(&1));
        assert!(s.topics.contains("Cloud Computing"));
    }

    #[test]
    fn absorption_order_does_not_change_totals() {
        let a = record("a.txt", "Informatik", "w ".repeat(10).trim(), 1, ".txt");
        let b = record("b.txt", "Informatik", "w ".repeat(20).trim(), 2, ".txt");
        let c = record("c.txt", "Recht", "cloud ".repeat(30).trim(), 3, ".md");

        let first: Aggregator = vec![a.clone(), b.clone(), c.clone()].into_iter().collect();
        let second: Aggregator = vec![c, a, b].into_iter().collect();

        for (label, s1) in first.categories() {
            let s2 = &second.categories()[label];
            assert_eq!(s1.document_count, s2.document_count);
            assert_eq!(s1.total_words, s2.total_words);
            assert_eq!(s1.total_size, s2.total_size);
            assert_eq!(s1.topics, s2.topics);
            assert_eq!(s1.file_types, s2.file_types);
        }
        assert_eq!(first.categories()["Informatik"].total_words, 30);
        assert_eq!(first.total_words(), second.total_words());
        assert_eq!(first.file_types(), second.file_types());
    }

    #[test]
    fn document_counts_sum_to_total() {
        let agg: Aggregator = (0..7)
            .map(|i| record(&format!("f{}.txt", i), if i % 2 == 0 { "A" } else { "B" }, "x y", 1, ".txt"))
            .collect();
        let sum: usize = agg.categories().values().map(|s| s.document_count).sum();
        assert_eq!(sum, agg.len());
        assert_eq!(agg.len(), 7);
    }
}
