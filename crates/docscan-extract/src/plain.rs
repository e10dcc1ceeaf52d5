use std::fs;
use std::path::Path;

use tracing::debug;

use docscan_core::error::{Error, Result};

/// Read a text file as UTF-8, falling back to Latin-1, and trim it.
pub fn extract(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::extraction(path, format!("failed to read text file: {}", e)))?;
    Ok(decode(&bytes, path).trim().to_string())
}

/// UTF-8 first; any byte sequence is valid Latin-1, so the fallback cannot fail.
pub fn decode(bytes: &[u8], path: &Path) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("{} is not valid UTF-8, decoding as Latin-1", path.display());
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}
