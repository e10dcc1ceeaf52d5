//! Zip bundles unpacked into the scan root before the walk.

use std::fs::{self, File};
use std::path::Path;

use tracing::info;
use zip::ZipArchive;

use docscan_core::error::{Error, Result};

/// Extract every entry of `archive` below `dest`, creating `dest` if needed.
/// Entries whose names would escape `dest` are rejected by the zip reader.
/// Returns the number of entries in the archive.
pub fn unpack(archive: &Path, dest: &Path) -> Result<usize> {
    let fail = |reason: String| Error::Archive { path: archive.to_path_buf(), reason };

    let file = File::open(archive).map_err(|e| fail(e.to_string()))?;
    let mut zip = ZipArchive::new(file).map_err(|e| fail(e.to_string()))?;
    fs::create_dir_all(dest).map_err(|e| fail(format!("cannot create {}: {}", dest.display(), e)))?;

    info!("Extracting {} to {}", archive.display(), dest.display());
    let entries = zip.len();
    zip.extract(dest).map_err(|e| fail(e.to_string()))?;
    info!("Extraction complete: {} entries", entries);
    Ok(entries)
}
