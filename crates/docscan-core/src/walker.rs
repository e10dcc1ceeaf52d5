//! Lazy traversal of the scan root with the skip policy applied up front.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanSettings;
use crate::error::Error;
use crate::types::extension_of;

/// Decides which paths under the root are candidates for extraction.
#[derive(Debug, Clone)]
pub struct SkipPolicy {
    skip_dirs: BTreeSet<String>,
    extensions: BTreeSet<String>,
}

impl SkipPolicy {
    pub fn new(skip_dirs: BTreeSet<String>, extensions: BTreeSet<String>) -> Self { Self { skip_dirs, extensions } }

    pub fn from_settings(settings: &ScanSettings) -> Self {
        Self::new(settings.effective_skip_dirs(), settings.effective_extensions())
    }

    /// Whether a single path segment (directory or file name) excludes its subtree.
    pub fn skips_segment(&self, segment: &str) -> bool {
        segment.starts_with('.') || self.skip_dirs.contains(segment)
    }

    /// Whether a path relative to the root is excluded by any of its segments.
    pub fn skips_relative(&self, relative: &Path) -> bool {
        relative.components().any(|c| match c {
            Component::Normal(seg) => self.skips_segment(&seg.to_string_lossy()),
            _ => false,
        })
    }

    pub fn accepts_extension(&self, path: &Path) -> bool { self.extensions.contains(&extension_of(path)) }

    /// Full check for a file path relative to the root.
    pub fn accepts_file(&self, relative: &Path) -> bool {
        !self.skips_relative(relative) && self.accepts_extension(relative)
    }
}

pub struct FileWalker {
    root: PathBuf,
    targets: Vec<PathBuf>,
    policy: SkipPolicy,
    excluded: Option<PathBuf>,
}

impl FileWalker {
    /// Walker over `settings.target_dirs` that never descends into the
    /// results directory, wherever it is configured.
    pub fn new(root: &Path, settings: &ScanSettings) -> Self {
        Self::with_policy(root, &settings.target_dirs, SkipPolicy::from_settings(settings))
            .excluding(settings.results_path(root))
    }

    pub fn with_policy(root: &Path, target_dirs: &[String], policy: SkipPolicy) -> Self {
        Self { root: root.to_path_buf(), targets: normalize_targets(target_dirs), policy, excluded: None }
    }

    /// Prune everything at or below `dir`.
    pub fn excluding(mut self, dir: PathBuf) -> Self {
        self.excluded = Some(dir);
        self
    }

    /// Candidate files, produced lazily. Per-entry errors are logged and skipped.
    pub fn walk(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.targets
            .iter()
            .filter_map(move |target| {
                let dir = self.root.join(target);
                if !dir.is_dir() {
                    warn!("Directory not found: {}", dir.display());
                    return None;
                }
                Some(dir)
            })
            .flat_map(move |dir| {
                WalkDir::new(dir)
                    .follow_links(false)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(move |e| self.keep_entry(e))
                    .filter_map(|entry| match entry {
                        Ok(e) => Some(e),
                        Err(err) => {
                            let failure = Error::Traversal {
                                path: err.path().map(Path::to_path_buf).unwrap_or_default(),
                                reason: err.to_string(),
                            };
                            warn!("{}", failure);
                            None
                        }
                    })
            })
            // symlinks are not followed into directories, but linked files count
            .filter(|e| e.file_type().is_file() || (e.path_is_symlink() && e.path().is_file()))
            .filter_map(move |e| {
                let path = e.into_path();
                let relative = path.strip_prefix(&self.root).unwrap_or(&path);
                if self.policy.accepts_file(relative) {
                    Some(path)
                } else {
                    debug!("Skipping {}", relative.display());
                    None
                }
            })
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() > 0 && self.excluded.as_deref().is_some_and(|dir| entry.path().starts_with(dir)) {
            debug!("Skipping results directory {}", entry.path().display());
            return false;
        }
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
        !self.policy.skips_relative(relative)
    }
}

/// Relative targets with `""` meaning the root; nested targets are dropped so
/// no file is yielded twice.
fn normalize_targets(target_dirs: &[String]) -> Vec<PathBuf> {
    let mut targets: Vec<PathBuf> = target_dirs
        .iter()
        .map(|t| PathBuf::from(t.trim_matches(|c| c == '/' || c == '\\')))
        .collect();
    if targets.is_empty() {
        targets.push(PathBuf::new());
    }
    targets.sort();
    targets.dedup();
    let mut kept: Vec<PathBuf> = Vec::new();
    for t in targets {
        if !kept.iter().any(|k| t.starts_with(k)) {
            kept.push(t);
        }
    }
    kept
}
