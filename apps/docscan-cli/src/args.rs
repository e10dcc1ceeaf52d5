use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};

use docscan_core::config::{expand_path, ScanMode, ScanSettings};

pub const USAGE: &str = "\
Usage:
  docscan scan [ROOT] [--mode office|text] [--target DIR]... [--skip DIR]...
               [--ext EXT]... [--max-reports N] [--timeout SECS]
               [--archive ZIP] [--log-file PATH] [--quiet]
  docscan classify <FILE> [--root DIR]
  docscan help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan(ScanArgs),
    Classify(ClassifyArgs),
    Help,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanArgs {
    pub root: Option<PathBuf>,
    pub mode: Option<ScanMode>,
    pub targets: Vec<String>,
    pub skips: Vec<String>,
    pub extensions: Vec<String>,
    pub max_reports: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub archive: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub quiet: bool,
}

impl ScanArgs {
    /// Layer command-line flags over the configured settings.
    pub fn apply(&self, settings: &mut ScanSettings) {
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if !self.targets.is_empty() {
            settings.target_dirs = self.targets.clone();
        }
        if !self.skips.is_empty() {
            settings.skip_dirs = Some(self.skips.clone());
        }
        if !self.extensions.is_empty() {
            settings.extensions = Some(self.extensions.clone());
        }
        if self.max_reports.is_some() {
            settings.max_reports = self.max_reports;
        }
        if self.timeout_secs.is_some() {
            settings.extract_timeout_secs = self.timeout_secs;
        }
        if let Some(archive) = &self.archive {
            settings.archive = Some(archive.to_string_lossy().into_owned());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyArgs {
    pub file: PathBuf,
    pub root: Option<PathBuf>,
}

/// Parse everything after the program name.
pub fn parse(args: &[String]) -> Result<Command> {
    let Some((cmd, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };
    match cmd.as_str() {
        "scan" => parse_scan(rest).map(Command::Scan),
        "classify" => parse_classify(rest).map(Command::Classify),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => bail!("Unknown command: {}", other),
    }
}

fn parse_scan(args: &[String]) -> Result<ScanArgs> {
    let mut out = ScanArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--mode" | "-m" => out.mode = Some(value(args, &mut i, flag)?.parse()?),
            "--target" | "-t" => out.targets.push(value(args, &mut i, flag)?.to_string()),
            "--skip" => out.skips.push(value(args, &mut i, flag)?.to_string()),
            "--ext" | "-e" => out.extensions.push(value(args, &mut i, flag)?.to_string()),
            "--max-reports" => out.max_reports = Some(number(value(args, &mut i, flag)?, flag)?),
            "--timeout" => out.timeout_secs = Some(number(value(args, &mut i, flag)?, flag)?),
            "--archive" | "-a" => out.archive = Some(expand_path(value(args, &mut i, flag)?)),
            "--log-file" => out.log_file = Some(expand_path(value(args, &mut i, flag)?)),
            "--quiet" | "-q" => out.quiet = true,
            _ if flag.starts_with('-') => bail!("Unknown option: {}", flag),
            _ if out.root.is_none() => out.root = Some(expand_path(flag)),
            _ => bail!("Unexpected argument: {}", flag),
        }
        i += 1;
    }
    Ok(out)
}

fn parse_classify(args: &[String]) -> Result<ClassifyArgs> {
    let mut file = None;
    let mut root = None;
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--root" | "-r" => root = Some(expand_path(value(args, &mut i, flag)?)),
            _ if flag.starts_with('-') => bail!("Unknown option: {}", flag),
            _ if file.is_none() => file = Some(expand_path(flag)),
            _ => bail!("Unexpected argument: {}", flag),
        }
        i += 1;
    }
    let file = file.ok_or_else(|| anyhow!("classify requires a file"))?;
    Ok(ClassifyArgs { file, root })
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i).map(String::as_str).ok_or_else(|| anyhow!("{} requires a value", flag))
}

fn number<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T> {
    raw.parse().map_err(|_| anyhow!("{} requires a number, got '{}'", flag, raw))
}
