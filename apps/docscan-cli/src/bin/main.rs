use std::env;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use docscan_cli::args::{self, ClassifyArgs, Command, ScanArgs};
use docscan_cli::logging;
use docscan_core::config::{expand_path, Config};
use docscan_pipeline::{FileOutcome, ScanSession};

fn main() -> anyhow::Result<()> {
    let argv: Vec<String> = env::args().skip(1).collect();
    let command = match args::parse(&argv) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, args::USAGE);
            std::process::exit(2);
        }
    };
    match command {
        Command::Help => {
            println!("{}", args::USAGE);
            Ok(())
        }
        Command::Scan(scan_args) => scan(scan_args),
        Command::Classify(classify_args) => classify(classify_args),
    }
}

fn load_config() -> anyhow::Result<Config> {
    Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })
}

fn scan(scan_args: ScanArgs) -> anyhow::Result<()> {
    let _guard = logging::init(scan_args.log_file.as_deref(), scan_args.quiet);
    let config = load_config()?;

    let root = match &scan_args.root {
        Some(root) => root.clone(),
        None => config.get::<String>("scan.root").map(expand_path).unwrap_or_else(|_| PathBuf::from(".")),
    };

    let mut session = ScanSession::from_config(&root, &config)?.configure(|settings| scan_args.apply(settings));
    // an archive is unpacked into the root, which may not exist yet
    if !root.is_dir() && session.settings().archive.is_none() {
        anyhow::bail!("Scan root is not a directory: {}", root.display());
    }
    if !scan_args.quiet {
        session = session.with_progress();
    }
    info!("Scanning {} ({} mode)", root.display(), session.settings().mode.as_str());

    let outcome = session.run().context("Document analysis failed")?;
    let meta = &outcome.report.metadata;

    println!("\nDocument Analysis Summary\n=========================");
    if !meta.complete {
        println!("⚠️  Scan was cancelled; the report is partial");
    }
    println!("Total documents processed: {}", meta.total_documents);
    println!("Categories found: {}", meta.total_categories);
    for (label, summary) in &outcome.report.categories {
        println!("- {}: {} documents, {} words", label, summary.document_count, summary.total_words);
    }
    let types: Vec<&str> = meta.file_types.keys().map(String::as_str).collect();
    println!("File types found: {}", types.join(", "));
    if meta.failed_files > 0 {
        println!("Files without text: {}", meta.failed_files);
    }
    println!("\nReports saved to:\n  {}\n  {}", outcome.paths.json.display(), outcome.paths.text.display());
    Ok(())
}

fn classify(classify_args: ClassifyArgs) -> anyhow::Result<()> {
    let _guard = logging::init(None, true);
    let config = load_config()?;

    let file = &classify_args.file;
    let root = classify_args
        .root
        .clone()
        .or_else(|| file.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let session = ScanSession::from_config(root, &config)?;

    match session.process_file(file) {
        FileOutcome::Record(record) => {
            println!("File: {}", record.path);
            println!("Category: {}", record.category);
            let topics: Vec<&str> = record.topics.iter().map(String::as_str).collect();
            println!("Topics: {}", if topics.is_empty() { "-".to_string() } else { topics.join(", ") });
            for (label, n) in &record.category_mentions {
                println!("  {}: {} mentions", label, n);
            }
            println!("Words: {} | Characters: {} | Lines: {}", record.words, record.chars, record.lines);
            Ok(())
        }
        FileOutcome::Empty => anyhow::bail!("No text could be extracted from {}", file.display()),
        FileOutcome::Failed(e) => Err(e.into()),
    }
}
