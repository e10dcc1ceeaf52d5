//! docscan-pipeline
//!
//! One scan session: walk the tree, extract and classify each file, fold the
//! records into an [`Aggregator`], then finalize and persist the report pair.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use chrono::{DateTime, Local, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use docscan_core::aggregator::Aggregator;
use docscan_core::classifier::KeywordClassifier;
use docscan_core::config::{expand_path, Config, ScanSettings};
use docscan_core::error::{Error, Result};
use docscan_core::traits::TextExtractor;
use docscan_core::types::{extension_of, DocumentRecord, FileKind, RecordSource, ScanReport};
use docscan_core::walker::FileWalker;
use docscan_extract::{archive, Extractors};
use docscan_report::{finalize, stamp_for, FinalizeContext, ReportPaths, ReportWriter};

/// What happened to one candidate file.
#[derive(Debug)]
pub enum FileOutcome {
    Record(DocumentRecord),
    /// Extraction succeeded but produced no text.
    Empty,
    Failed(Error),
}

#[derive(Debug)]
pub struct ScanResult {
    pub aggregator: Aggregator,
    /// False when the scan was cancelled before the walk finished.
    pub complete: bool,
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub report: ScanReport,
    pub paths: ReportPaths,
}

pub struct ScanSession<E: TextExtractor + 'static> {
    root: PathBuf,
    settings: ScanSettings,
    extractor: Arc<E>,
    classifier: KeywordClassifier,
    cancel: Arc<AtomicBool>,
    progress: Option<ProgressBar>,
}

impl ScanSession<Extractors> {
    /// Session with the built-in extractors and classifier tables from `config`.
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> anyhow::Result<Self> {
        let settings = config.scan()?;
        let extractors = Extractors::new(config.ocr()?);
        let classifier = KeywordClassifier::from_settings(&config.classifier()?);
        Ok(Self::new(root, settings, extractors, classifier))
    }
}

impl<E: TextExtractor + 'static> ScanSession<E> {
    pub fn new(root: impl Into<PathBuf>, settings: ScanSettings, extractor: E, classifier: KeywordClassifier) -> Self {
        Self {
            root: root.into(),
            settings,
            extractor: Arc::new(extractor),
            classifier,
            cancel: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    /// Show a spinner ticked once per processed file.
    pub fn with_progress(mut self) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}") {
            pb.set_style(style);
        }
        self.progress = Some(pb);
        self
    }

    /// Adjust the settings after construction, e.g. with command-line overrides.
    pub fn configure(mut self, adjust: impl FnOnce(&mut ScanSettings)) -> Self {
        adjust(&mut self.settings);
        self
    }

    /// Setting the flag stops the scan before the next file.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &ScanSettings { &self.settings }

    pub fn process_file(&self, path: &Path) -> FileOutcome {
        info!("Processing: {}", path.display());
        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => return FileOutcome::Failed(Error::extraction(path, format!("cannot stat file: {}", e))),
        };
        let Some(kind) = FileKind::from_path(path) else {
            return FileOutcome::Failed(Error::extraction(path, "unsupported file type"));
        };

        let text = match self.extract(path) {
            Ok(text) => text,
            Err(e) => return FileOutcome::Failed(e),
        };
        if text.trim().is_empty() {
            return FileOutcome::Empty;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let classification = self.classifier.classify(&text, relative);
        let modified = meta.modified().map(|t| DateTime::<Local>::from(t).naive_local()).unwrap_or_default();
        let ext = extension_of(path);

        FileOutcome::Record(DocumentRecord::from_text(
            RecordSource {
                path: relative.to_string_lossy().replace('\\', "/"),
                size: meta.len(),
                modified,
                extension: if ext.is_empty() { ext } else { format!(".{}", ext) },
                kind,
            },
            &text,
            classification.category,
            classification.topics,
            self.classifier.mentions(&text),
            self.settings.preview_chars,
        ))
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let Some(limit) = self.settings.extract_timeout() else {
            return self.extractor.extract(path);
        };
        let (tx, rx) = mpsc::channel();
        let extractor = Arc::clone(&self.extractor);
        let owned = path.to_path_buf();
        std::thread::spawn(move || {
            // the receiver may be gone after a timeout
            let _ = tx.send(extractor.extract(&owned));
        });
        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::extraction(path, format!("timed out after {}s", limit.as_secs_f32()))),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::extraction(path, "extractor thread panicked")),
        }
    }

    pub fn scan(&self) -> ScanResult {
        info!("Starting document scan in: {}", self.root.display());
        let walker = FileWalker::new(&self.root, &self.settings);
        let mut aggregator = Aggregator::new();
        let mut complete = true;

        for path in walker.walk() {
            if self.cancel.load(Ordering::SeqCst) {
                warn!("Scan cancelled after {} documents", aggregator.len());
                complete = false;
                break;
            }
            match self.process_file(&path) {
                FileOutcome::Record(record) => aggregator.absorb(record),
                FileOutcome::Empty => {
                    info!("No text extracted from {}", path.display());
                    aggregator.record_failure();
                }
                FileOutcome::Failed(e) => {
                    error!("Error processing {}: {}", path.display(), e);
                    aggregator.record_failure();
                }
            }
            if let Some(pb) = &self.progress {
                pb.inc(1);
                pb.set_message(path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
            }
        }
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
        ScanResult { aggregator, complete }
    }

    /// Unpack `settings.archive`, if set, into the root.
    pub fn unpack_archive(&self) -> Result<Option<usize>> {
        let Some(bundle) = &self.settings.archive else {
            return Ok(None);
        };
        archive::unpack(&expand_path(bundle), &self.root).map(Some)
    }

    /// Unpack any configured archive, then scan, finalize and write the report
    /// pair stamped with the current time.
    pub fn run(&self) -> Result<ScanOutcome> { self.run_at(Local::now().naive_local()) }

    pub fn run_at(&self, generated_at: NaiveDateTime) -> Result<ScanOutcome> {
        self.unpack_archive()?;
        let ScanResult { aggregator, complete } = self.scan();
        let report = finalize(
            aggregator,
            FinalizeContext {
                source_root: self.root.display().to_string(),
                scan_mode: self.settings.mode.as_str().to_string(),
                generated_at,
                complete,
            },
        );
        let writer = ReportWriter::from_settings(&self.root, &self.settings);
        let paths = writer.write(&report, &stamp_for(generated_at))?;
        info!(
            "Scan finished: {} documents, {} categories, {} failed; reports in {}",
            report.metadata.total_documents,
            report.metadata.total_categories,
            report.metadata.failed_files,
            writer.results_dir().display()
        );
        Ok(ScanOutcome { report, paths })
    }
}
