//! Persisting report pairs and pruning old ones.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use docscan_core::config::ScanSettings;
use docscan_core::error::{Error, Result};
use docscan_core::types::ScanReport;

use crate::text::{render_text, TextOptions};
use crate::to_json;

const JSON_PREFIX: &str = "document_analysis_";
const TEXT_PREFIX: &str = "document_summary_";

/// `YYYYMMDD_HHMMSS`, the stamp embedded in report file names.
pub fn stamp_for(at: NaiveDateTime) -> String { at.format("%Y%m%d_%H%M%S").to_string() }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub stamp: String,
    pub json: PathBuf,
    pub text: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    results_dir: PathBuf,
    max_reports: Option<usize>,
    max_age_days: Option<u64>,
    text: TextOptions,
}

impl ReportWriter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self { results_dir: results_dir.into(), max_reports: None, max_age_days: None, text: TextOptions::default() }
    }

    /// Results directory resolved against the scanned root, with the
    /// retention and listing options from `settings`.
    pub fn from_settings(root: &Path, settings: &ScanSettings) -> Self {
        Self::new(settings.results_path(root))
            .with_retention(settings.max_reports, settings.max_report_age_days)
            .with_text_options(TextOptions { min_words: settings.min_words_listing, preview_words: settings.preview_words })
    }

    pub fn with_retention(mut self, max_reports: Option<usize>, max_age_days: Option<u64>) -> Self {
        self.max_reports = max_reports;
        self.max_age_days = max_age_days;
        self
    }

    pub fn with_text_options(mut self, text: TextOptions) -> Self {
        self.text = text;
        self
    }

    pub fn results_dir(&self) -> &Path { &self.results_dir }

    /// Write the JSON and text reports for `stamp`, then apply retention.
    ///
    /// Existing files are never overwritten; a clashing stamp gets a `_N`
    /// suffix.
    pub fn write(&self, report: &ScanReport, stamp: &str) -> Result<ReportPaths> {
        fs::create_dir_all(&self.results_dir)
            .map_err(|source| Error::ReportWrite { path: self.results_dir.clone(), source })?;

        let paths = self.free_paths(stamp);
        let json = to_json(report)?;
        fs::write(&paths.json, json).map_err(|source| Error::ReportWrite { path: paths.json.clone(), source })?;
        let text = render_text(report, &self.text);
        fs::write(&paths.text, text).map_err(|source| Error::ReportWrite { path: paths.text.clone(), source })?;
        info!("Reports generated: {}, {}", paths.json.display(), paths.text.display());

        if self.max_reports.is_some() || self.max_age_days.is_some() {
            self.prune(Some(&paths.stamp));
        }
        Ok(paths)
    }

    fn free_paths(&self, stamp: &str) -> ReportPaths {
        let mut candidate = stamp.to_string();
        let mut n = 1;
        loop {
            let paths = self.paths_for(&candidate);
            if !paths.json.exists() && !paths.text.exists() {
                return paths;
            }
            candidate = format!("{}_{}", stamp, n);
            n += 1;
        }
    }

    fn paths_for(&self, stamp: &str) -> ReportPaths {
        ReportPaths {
            stamp: stamp.to_string(),
            json: self.results_dir.join(format!("{}{}.json", JSON_PREFIX, stamp)),
            text: self.results_dir.join(format!("{}{}.txt", TEXT_PREFIX, stamp)),
        }
    }

    /// Delete report pairs beyond `max_reports` (newest kept, by modification
    /// time) and pairs older than `max_age_days`. The `protect` stamp is
    /// never removed. Returns the number of files deleted.
    pub fn prune(&self, protect: Option<&str>) -> usize {
        let entries = match fs::read_dir(&self.results_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list {} for cleanup: {}", self.results_dir.display(), e);
                return 0;
            }
        };

        let mut pairs: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(stamp) = path.file_name().and_then(|n| n.to_str()).and_then(report_stamp) {
                pairs.entry(stamp.to_string()).or_default().push(path);
            }
        }

        let mut dated: Vec<(SystemTime, String, Vec<PathBuf>)> =
            pairs.into_iter().map(|(stamp, files)| (newest_mtime(&files), stamp, files)).collect();
        dated.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        let cutoff = self
            .max_age_days
            .and_then(|days| SystemTime::now().checked_sub(Duration::from_secs(days.saturating_mul(86_400))));

        let mut removed = 0;
        let mut kept = 0;
        for (mtime, stamp, files) in dated {
            if protect == Some(stamp.as_str()) {
                kept += 1;
                continue;
            }
            let too_many = self.max_reports.is_some_and(|max| kept >= max);
            let too_old = cutoff.is_some_and(|cutoff| mtime < cutoff);
            if !too_many && !too_old {
                kept += 1;
                continue;
            }
            debug!("Pruning report pair {}", stamp);
            for file in files {
                match fs::remove_file(&file) {
                    Ok(()) => {
                        info!("Removed old report: {}", file.display());
                        removed += 1;
                    }
                    Err(source) => warn!("{}", Error::RetentionCleanup { path: file, source }),
                }
            }
        }
        removed
    }
}

/// Stamp of a report file name, if it is one of ours.
fn report_stamp(name: &str) -> Option<&str> {
    name.strip_prefix(JSON_PREFIX)
        .and_then(|rest| rest.strip_suffix(".json"))
        .or_else(|| name.strip_prefix(TEXT_PREFIX).and_then(|rest| rest.strip_suffix(".txt")))
}

fn newest_mtime(files: &[PathBuf]) -> SystemTime {
    files
        .iter()
        .filter_map(|f| fs::metadata(f).and_then(|m| m.modified()).ok())
        .max()
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
