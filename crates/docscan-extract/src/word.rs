use std::path::Path;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};
use tracing::debug;

use docscan_core::error::{Error, Result};

use crate::clean_text;

/// Visible body text of a Word document: paragraphs and table cells, in order.
///
/// Only the DOCX container is understood; `.doc`, `.odt` and `.rtf` files
/// fail to parse and are reported as extraction failures.
pub fn extract(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::extraction(path, format!("failed to read document: {}", e)))?;
    let doc = docx_rs::read_docx(&bytes).map_err(|e| Error::extraction(path, format!("failed to parse DOCX: {}", e)))?;

    let mut out = String::new();
    for child in &doc.document.children {
        push_child(child, &mut out);
    }
    let text = clean_text(&out);
    debug!("DOCX {}: {} chars", path.display(), text.len());
    Ok(text)
}

fn push_child(child: &DocumentChild, out: &mut String) {
    match child {
        DocumentChild::Paragraph(para) => {
            push_paragraph(para, out);
            out.push('\n');
        }
        DocumentChild::Table(table) => {
            for row in &table.rows {
                let TableChild::TableRow(tr) = row;
                let mut cells = Vec::new();
                for cell in &tr.cells {
                    let TableRowChild::TableCell(tc) = cell;
                    let mut cell_text = String::new();
                    for content in &tc.children {
                        if let TableCellContent::Paragraph(para) = content {
                            push_paragraph(para, &mut cell_text);
                        }
                    }
                    cells.push(cell_text);
                }
                out.push_str(&cells.join(" | "));
                out.push('\n');
            }
        }
        _ => {}
    }
}

fn push_paragraph(para: &Paragraph, out: &mut String) {
    for child in &para.children {
        match child {
            ParagraphChild::Run(run) => push_runs(&run.children, out),
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        push_runs(&run.children, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_runs(children: &[RunChild], out: &mut String) {
    for child in children {
        match child {
            RunChild::Text(text) => out.push_str(&text.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}
