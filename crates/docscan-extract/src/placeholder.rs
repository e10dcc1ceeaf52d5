//! Stand-in text for formats without a real extractor yet.
//!
//! The file still enters the corpus, with a near-zero word count, instead of
//! being dropped. Callers must not treat this as document content.

use std::path::Path;

use docscan_core::types::FileKind;

pub fn text_for(kind: FileKind, path: &Path) -> String {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let tag = match kind {
        FileKind::Spreadsheet => "Spreadsheet",
        FileKind::Presentation => "Presentation",
        _ => "Document",
    };
    format!("[{}] {} - Content extraction not fully implemented", tag, name)
}
