use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use docscan_core::classifier::KeywordClassifier;
use docscan_core::config::{Config, ScanSettings};
use docscan_core::error::{Error, Result};
use docscan_core::traits::TextExtractor;
use docscan_extract::Extractors;
use docscan_pipeline::ScanSession;
use docscan_report::from_json;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn words(n: usize) -> String { (0..n).map(|i| format!("wort{}", i)).collect::<Vec<_>>().join(" ") }

fn session(root: &Path, settings: ScanSettings) -> ScanSession<Extractors> {
    ScanSession::new(root, settings, Extractors::default(), KeywordClassifier::default())
}

fn stamp_time(sec: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 6).and_then(|d| d.and_hms_opt(7, 8, sec)).unwrap()
}

#[test]
fn informatik_document_is_classified_and_tagged() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "informatik/vorlesung.txt", "cloud computing examples for the lecture series");

    let outcome = session(tmp.path(), ScanSettings::default()).run_at(stamp_time(0)).unwrap();
    let summary = &outcome.report.categories["Informatik"];
    assert_eq!(summary.document_count, 1);
    assert!(summary.topics.contains("Cloud Computing"));
    assert_eq!(outcome.report.documents[0].path, "informatik/vorlesung.txt");
    assert!(outcome.report.metadata.complete);
    assert_eq!(outcome.report.documents[0].words, 7);

    assert!(outcome.paths.json.starts_with(tmp.path().join("document_analysis")));
    assert!(outcome.paths.json.ends_with("document_analysis_20240506_070800.json"));
    let on_disk = from_json(&fs::read_to_string(&outcome.paths.json).unwrap()).unwrap();
    assert_eq!(on_disk, outcome.report);
    assert!(fs::read_to_string(&outcome.paths.text).unwrap().contains("FILE: informatik/vorlesung.txt"));
}

#[test]
fn word_counts_add_up_per_category() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "design/a.txt", &words(10));
    write(tmp.path(), "design/b.txt", &words(20));
    write(tmp.path(), "design/sub/c.md", &words(30));

    let settings = ScanSettings { extensions: Some(vec!["txt".into(), "md".into()]), ..ScanSettings::default() };
    let report = session(tmp.path(), settings).run_at(stamp_time(1)).unwrap().report;
    let summary = &report.categories["Design"];
    assert_eq!(summary.document_count, 3);
    assert_eq!(summary.total_words, 60);
    assert_eq!(report.metadata.total_words, 60);
    assert_eq!(report.metadata.avg_words_per_doc, 20.0);
}

#[test]
fn vcs_directories_are_never_listed() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), ".git/info/notes.txt", "informatik informatik");
    write(tmp.path(), "docs/readme.txt", "allgemeine hinweise zum studium");

    let report = session(tmp.path(), ScanSettings::default()).run_at(stamp_time(2)).unwrap().report;
    assert_eq!(report.metadata.total_documents, 1);
    assert!(report.documents.iter().all(|d| !d.path.contains(".git")));
    assert_eq!(report.documents[0].category, "Allgemein");
}

#[test]
fn corrupt_file_does_not_abort_scan() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "recht/broken.pdf", "%PDF-1.4 garbage without objects");
    write(tmp.path(), "recht/vertrag.txt", "vertragsrecht und haftung im detail");

    let report = session(tmp.path(), ScanSettings::default()).run_at(stamp_time(3)).unwrap().report;
    assert_eq!(report.metadata.total_documents, 1);
    assert_eq!(report.metadata.failed_files, 1);
    assert_eq!(report.categories["Rechtswissenschaften"].document_count, 1);
}

struct CancelAfterFirst {
    flag: Arc<AtomicBool>,
}

impl TextExtractor for CancelAfterFirst {
    fn extract(&self, path: &Path) -> Result<String> {
        self.flag.store(true, Ordering::SeqCst);
        Ok(fs::read_to_string(path).unwrap_or_default())
    }
}

#[test]
fn cancelled_scan_writes_consistent_partial_report() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.txt", "erste datei mit text");
    write(tmp.path(), "b.txt", "zweite datei mit text");
    write(tmp.path(), "c.txt", "dritte datei mit text");

    let flag = Arc::new(AtomicBool::new(false));
    let extractor = CancelAfterFirst { flag: Arc::clone(&flag) };
    let outcome = ScanSession::new(tmp.path(), ScanSettings::default(), extractor, KeywordClassifier::default())
        .with_cancel_flag(flag)
        .run_at(stamp_time(4))
        .unwrap();

    let report = outcome.report;
    assert!(!report.metadata.complete);
    assert_eq!(report.metadata.total_documents, 1);
    assert_eq!(report.documents[0].path, "a.txt");
    let counted: usize = report.categories.values().map(|s| s.document_count).sum();
    assert_eq!(counted, report.metadata.total_documents);
    assert!(!from_json(&fs::read_to_string(&outcome.paths.json).unwrap()).unwrap().metadata.complete);
}

#[test]
fn second_run_ignores_previous_reports() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "kultur/museum.txt", "ausstellung und geschichte der kunst");

    let first = session(tmp.path(), ScanSettings::default()).run_at(stamp_time(5)).unwrap();
    let second = session(tmp.path(), ScanSettings::default()).run_at(stamp_time(5)).unwrap();
    assert_eq!(first.report.metadata.total_documents, second.report.metadata.total_documents);
    assert_ne!(first.paths.json, second.paths.json);
}

#[test]
fn retention_from_settings_limits_pairs() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "notes.txt", "ein paar worte zum testen");

    let settings = ScanSettings { max_reports: Some(1), ..ScanSettings::default() };
    for sec in 10..13 {
        session(tmp.path(), settings.clone()).run_at(stamp_time(sec)).unwrap();
    }
    let files = fs::read_dir(tmp.path().join("document_analysis")).unwrap().count();
    assert_eq!(files, 2);
}

#[test]
fn session_from_config_uses_configured_tables() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "misc/plan.txt", "a note about robotics labs");

    let config = Config::from_toml_str(
        r#"
        [classifier]
        fallback = "Sonstiges"
        categories = [{ keyword = "robotics", label = "Robotik" }]
        "#,
    )
    .unwrap();
    let report = ScanSession::from_config(tmp.path(), &config).unwrap().run_at(stamp_time(20)).unwrap().report;
    assert_eq!(report.documents[0].category, "Robotik");
}

#[test]
fn nested_results_dir_is_not_rescanned() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "notes.txt", "ein paar worte zum testen");

    let settings = ScanSettings { results_dir: "out/reports".into(), ..ScanSettings::default() };
    let first = session(tmp.path(), settings.clone()).run_at(stamp_time(30)).unwrap();
    let second = session(tmp.path(), settings).run_at(stamp_time(31)).unwrap();

    assert!(first.paths.text.starts_with(tmp.path().join("out/reports")));
    assert_eq!(first.report.metadata.total_documents, 1);
    assert_eq!(second.report.metadata.total_documents, 1);
    assert!(second.report.documents.iter().all(|d| !d.path.starts_with("out/")));
}

fn zip_bundle(path: &Path, files: &[(&str, &str)]) {
    use std::io::Write;
    let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
    for (name, body) in files {
        zip.start_file(*name, zip::write::FileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn archive_is_unpacked_into_root_before_scan() {
    let tmp = TempDir::new().unwrap();
    let bundle = tmp.path().join("university begin.zip");
    zip_bundle(&bundle, &[("informatik/skript.txt", "cloud computing und software engineering grundlagen")]);
    let root = tmp.path().join("university_documents");

    let settings = ScanSettings { archive: Some(bundle.to_string_lossy().into_owned()), ..ScanSettings::default() };
    let report = session(&root, settings).run_at(stamp_time(40)).unwrap().report;
    assert!(root.join("informatik/skript.txt").is_file());
    assert_eq!(report.metadata.total_documents, 1);
    assert_eq!(report.documents[0].category, "Informatik");
}

#[test]
fn unreadable_archive_aborts_run() {
    let tmp = TempDir::new().unwrap();
    let bundle = tmp.path().join("broken.zip");
    fs::write(&bundle, "not a zip").unwrap();
    let root = tmp.path().join("root");

    let settings = ScanSettings { archive: Some(bundle.to_string_lossy().into_owned()), ..ScanSettings::default() };
    let err = session(&root, settings).run_at(stamp_time(41)).unwrap_err();
    assert!(matches!(err, Error::Archive { .. }));
    assert!(!root.join("document_analysis").exists());
}
