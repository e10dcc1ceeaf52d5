//! Fixed-width, human-readable rendering of a [`ScanReport`].

use std::fmt::Write;

use docscan_core::types::{DocumentRecord, ScanReport};

const WIDE: usize = 80;
const NARROW: usize = 60;

#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Documents with fewer words are counted but not listed.
    pub min_words: usize,
    /// Words of preview shown per listed document.
    pub preview_words: usize,
}

impl Default for TextOptions {
    fn default() -> Self { Self { min_words: 5, preview_words: 50 } }
}

pub fn render_text(report: &ScanReport, opts: &TextOptions) -> String {
    let mut out = String::new();
    let meta = &report.metadata;

    rule(&mut out, '=', WIDE);
    out.push_str("DOCUMENT ANALYSIS REPORT\n");
    let _ = writeln!(out, "Generated: {}", meta.generated_at.format("%Y-%m-%d %H:%M:%S"));
    rule(&mut out, '=', WIDE);

    section(&mut out, "Summary");
    let _ = writeln!(out, "Source Root: {}", meta.source_root);
    let _ = writeln!(out, "Scan Mode: {}", meta.scan_mode);
    if !meta.complete {
        out.push_str("Status: incomplete (scan was cancelled)\n");
    }
    let _ = writeln!(out, "Total Documents: {}", thousands(meta.total_documents as u64));
    let _ = writeln!(out, "Total Categories: {}", thousands(meta.total_categories as u64));
    let _ = writeln!(out, "Total Size: {:.2} MB", meta.total_size_mb);
    let _ = writeln!(out, "Total Words: {}", thousands(meta.total_words));
    let _ = writeln!(out, "Total Characters: {}", thousands(meta.total_chars));
    let _ = writeln!(out, "Average Words/Document: {:.2}", meta.avg_words_per_doc);
    if meta.failed_files > 0 {
        let _ = writeln!(out, "Failed Files: {}", thousands(meta.failed_files as u64));
    }

    section(&mut out, "File Type Analysis");
    let mut types: Vec<(&String, &usize)> = meta.file_types.iter().collect();
    types.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (ext, count) in types {
        let name = if ext.is_empty() { "(none)" } else { ext.as_str() };
        let _ = writeln!(out, "{}: {} files", name, thousands(*count as u64));
    }

    section(&mut out, "Category Breakdown");
    let mut categories: Vec<_> = report.categories.iter().collect();
    categories.sort_by(|a, b| b.1.document_count.cmp(&a.1.document_count).then_with(|| a.0.cmp(b.0)));
    for (label, summary) in categories {
        let _ = writeln!(
            out,
            "{}: {} documents | {} words | {:.2} MB",
            label,
            thousands(summary.document_count as u64),
            thousands(summary.total_words),
            summary.total_size_mb()
        );
        if !summary.topics.is_empty() {
            let topics: Vec<&str> = summary.topics.iter().map(String::as_str).collect();
            let _ = writeln!(out, "  Topics: {}", topics.join(", "));
        }
    }

    if meta.category_mentions.values().any(|n| *n > 0) {
        section(&mut out, "Category Mentions");
        for (label, count) in meta.category_mentions.iter().filter(|(_, n)| **n > 0) {
            let _ = writeln!(out, "- {}: {} mentions", label, thousands(*count as u64));
        }
    }

    section(&mut out, "Document Details");
    let mut listed: Vec<&DocumentRecord> = report.documents.iter().filter(|d| d.words >= opts.min_words).collect();
    listed.sort_by(|a, b| a.path.to_lowercase().cmp(&b.path.to_lowercase()));
    for doc in listed {
        document_entry(&mut out, doc, opts.preview_words);
    }

    out.push('\n');
    rule(&mut out, '=', WIDE);
    out.push_str("END OF REPORT\n");
    rule(&mut out, '=', WIDE);
    out
}

fn document_entry(out: &mut String, doc: &DocumentRecord, preview_words: usize) {
    out.push('\n');
    rule(out, '=', NARROW);
    let _ = writeln!(out, "FILE: {}", doc.path);
    rule(out, '=', NARROW);
    let _ = writeln!(
        out,
        "Type: {} | Size: {:.1} KB | Words: {} | Lines: {}",
        doc.extension,
        doc.size as f64 / 1024.0,
        thousands(doc.words as u64),
        thousands(doc.lines as u64)
    );
    let _ = writeln!(out, "Modified: {}", doc.modified.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Category: {}", doc.category);
    if !doc.topics.is_empty() {
        let topics: Vec<&str> = doc.topics.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Topics: {}", topics.join(", "));
    }
    let refs: Vec<String> =
        doc.category_mentions.iter().filter(|(_, n)| **n > 0).map(|(label, n)| format!("{}:{}", label, n)).collect();
    if !refs.is_empty() {
        let _ = writeln!(out, "Category References: {}", refs.join(", "));
    }
    let preview = first_words(&doc.preview, preview_words);
    if !preview.is_empty() {
        let _ = writeln!(out, "\nPreview: {}", preview);
    }
}

fn section(out: &mut String, title: &str) {
    out.push('\n');
    rule(out, '=', WIDE);
    out.push_str(&title.to_uppercase());
    out.push('\n');
    rule(out, '=', WIDE);
    out.push('\n');
}

fn rule(out: &mut String, c: char, width: usize) {
    out.extend(std::iter::repeat(c).take(width));
    out.push('\n');
}

fn first_words(text: &str, n: usize) -> String {
    let mut words = text.split_whitespace();
    let head: Vec<&str> = words.by_ref().take(n).collect();
    let mut joined = head.join(" ");
    if words.next().is_some() {
        joined.push_str("...");
    }
    joined
}

/// `1234567` -> `1,234,567`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
