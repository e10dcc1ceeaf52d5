use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use tracing::{debug, info, warn};

use docscan_core::error::{Error, Result};

/// Extract every page in order, one newline between pages.
///
/// A page that yields no text contributes an empty string; only a document
/// that cannot be loaded at all is an error.
pub fn extract(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::extraction(path, format!("failed to read PDF file: {}", e)))?;
    debug!("PDF file size: {} bytes", bytes.len());

    // lopdf can panic on malformed fonts and xref tables.
    let pages = match catch_unwind(AssertUnwindSafe(|| extract_pages(&bytes, path))) {
        Ok(pages) => pages?,
        Err(_) => return Err(Error::extraction(path, "PDF parser panicked, likely malformed document")),
    };

    info!("PDF {}: {} pages", path.file_name().unwrap_or_default().to_string_lossy(), pages.len());
    Ok(pages.join("\n").trim().to_string())
}

fn extract_pages(bytes: &[u8], path: &Path) -> Result<Vec<String>> {
    let doc = Document::load_mem(bytes).map_err(|e| Error::extraction(path, format!("failed to parse PDF: {}", e)))?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let pages = page_numbers
        .into_iter()
        .map(|n| {
            let page = catch_unwind(AssertUnwindSafe(|| doc.extract_text(&[n])));
            match page {
                Ok(Ok(text)) => text.trim_end().to_string(),
                Ok(Err(e)) => {
                    warn!("Page {} of {} yielded no text: {}", n, path.display(), e);
                    String::new()
                }
                Err(_) => {
                    warn!("Page {} of {} panicked during extraction", n, path.display());
                    String::new()
                }
            }
        })
        .collect();
    Ok(pages)
}
