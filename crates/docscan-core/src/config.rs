//! Configuration loader, scan settings and path helpers.
//!
//! Uses Figment to merge `docscan.toml` + `docscan.<env>.toml` + `DOCSCAN_*`
//! env vars. Sections are extracted on demand with [`Config::get`].
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("docscan.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("docscan.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("docscan.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("docscan.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("DOCSCAN_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    /// Build from an inline TOML document, ignoring files and environment.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let config = Self { figment: Figment::new().merge(Toml::string(toml)) };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed section, or its default when the section is absent.
    pub fn section<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        if self.figment.find_value(key).is_err() {
            return Ok(T::default());
        }
        self.get(key)
    }

    pub fn scan(&self) -> anyhow::Result<ScanSettings> { self.section("scan") }

    pub fn ocr(&self) -> anyhow::Result<OcrSettings> { self.section("ocr") }

    pub fn classifier(&self) -> anyhow::Result<ClassifierSettings> { self.section("classifier") }

    fn validate(&self) -> anyhow::Result<()> {
        let scan = self.scan()?;
        if scan.preview_chars == 0 {
            return Err(Error::InvalidConfig("scan.preview_chars must be greater than zero".into()).into());
        }
        if scan.max_reports == Some(0) {
            return Err(Error::InvalidConfig("scan.max_reports must be at least 1 when set".into()).into());
        }
        if scan.results_dir.trim().is_empty() {
            return Err(Error::InvalidConfig("scan.results_dir must not be empty".into()).into());
        }
        Ok(())
    }
}

/// Which preset of skip directories and extensions a scan starts from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Office, image, spreadsheet and presentation formats; small denylist.
    #[default]
    Office,
    /// Text-oriented formats with a broad infrastructure denylist.
    Text,
}

impl ScanMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Text => "text",
        }
    }

    pub fn default_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Office => &[
                "pdf", "docx", "doc", "txt", "rtf", "odt", "jpg", "jpeg", "png", "bmp", "tiff", "tif", "xlsx", "xls",
                "ods", "pptx", "ppt", "odp",
            ],
            Self::Text => &["pdf", "docx", "doc", "txt", "rtf", "odt", "jpg", "jpeg", "png", "md", "html", "json"],
        }
    }

    pub fn default_skip_dirs(self) -> &'static [&'static str] {
        match self {
            Self::Office => &["venv", "__pycache__", ".git", "node_modules", "document_analysis"],
            Self::Text => &[
                ".git", ".github", ".svn", "__pycache__", ".pytest_cache", ".mypy_cache", ".venv", "venv", "env",
                "ENV", "node_modules", "build", "dist", "target", "out", "bin", ".idea", ".vscode", ".vs", "logs",
                "cache", "temp", "tmp", "document_analysis", "assets", "pictures", "images", "img", "css", "js",
                "fonts", "bower_components",
            ],
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "office" => Ok(Self::Office),
            "text" => Ok(Self::Text),
            other => Err(Error::InvalidConfig(format!("unknown scan mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub mode: ScanMode,
    /// Subdirectories of the root to scan; empty means the whole root.
    pub target_dirs: Vec<String>,
    /// Overrides the mode's denylist when set.
    pub skip_dirs: Option<Vec<String>>,
    /// Overrides the mode's extension set when set. Entries may carry a dot.
    pub extensions: Option<Vec<String>>,
    /// Report directory, relative to the root unless absolute.
    pub results_dir: String,
    /// Zip bundle unpacked into the root before the walk.
    pub archive: Option<String>,
    pub max_reports: Option<usize>,
    pub max_report_age_days: Option<u64>,
    pub preview_chars: usize,
    pub preview_words: usize,
    pub min_words_listing: usize,
    pub extract_timeout_secs: Option<u64>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            mode: ScanMode::Office,
            target_dirs: Vec::new(),
            skip_dirs: None,
            extensions: None,
            results_dir: "document_analysis".to_string(),
            archive: None,
            max_reports: None,
            max_report_age_days: None,
            preview_chars: 500,
            preview_words: 50,
            min_words_listing: 5,
            extract_timeout_secs: None,
        }
    }
}

impl ScanSettings {
    pub fn for_mode(mode: ScanMode) -> Self { Self { mode, ..Self::default() } }

    /// Effective segment denylist. A bare results directory name is added
    /// here; nested or absolute ones are pruned by path in the walker.
    pub fn effective_skip_dirs(&self) -> BTreeSet<String> {
        let mut dirs: BTreeSet<String> = match &self.skip_dirs {
            Some(dirs) => dirs.iter().cloned().collect(),
            None => self.mode.default_skip_dirs().iter().map(|s| s.to_string()).collect(),
        };
        let mut parts = Path::new(&self.results_dir).components();
        if let (Some(std::path::Component::Normal(name)), None) = (parts.next(), parts.next()) {
            dirs.insert(name.to_string_lossy().into_owned());
        }
        dirs
    }

    /// Results directory resolved against `root`.
    pub fn results_path(&self, root: &Path) -> PathBuf { resolve_with_base(root, &self.results_dir) }

    /// Effective extension set, lowercased and without leading dots.
    pub fn effective_extensions(&self) -> BTreeSet<String> {
        match &self.extensions {
            Some(exts) => exts.iter().map(|e| e.trim_start_matches('.').to_lowercase()).collect(),
            None => self.mode.default_extensions().iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Per-file extraction limit; zero disables it.
    pub fn extract_timeout(&self) -> Option<std::time::Duration> {
        self.extract_timeout_secs.filter(|s| *s > 0).map(std::time::Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub command: String,
    pub language: String,
    pub contrast: f32,
    pub sharpness: f32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self { command: "tesseract".to_string(), language: "eng".to_string(), contrast: 2.0, sharpness: 2.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub label: String,
}

/// Optional replacement tables for the classifier; list order is priority.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub fallback: Option<String>,
    pub categories: Option<Vec<KeywordEntry>>,
    pub topics: Option<Vec<KeywordEntry>>,
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::from_toml_str("").expect("config");
        let scan = cfg.scan().expect("scan");
        assert_eq!(scan.mode, ScanMode::Office);
        assert_eq!(scan.preview_chars, 500);
        assert!(scan.effective_extensions().contains("pptx"));
        assert!(scan.effective_skip_dirs().contains("node_modules"));
        assert_eq!(cfg.ocr().expect("ocr").command, "tesseract");
    }

    #[test]
    fn overrides_replace_presets() {
        let cfg = Config::from_toml_str(
            r#"
            [scan]
            mode = "text"
            extensions = [".TXT", "md"]
            skip_dirs = ["private"]
            results_dir = "out_reports"
            max_reports = 3
            "#,
        )
        .expect("config");
        let scan = cfg.scan().expect("scan");
        assert_eq!(scan.mode, ScanMode::Text);
        let exts: Vec<_> = scan.effective_extensions().into_iter().collect();
        assert_eq!(exts, vec!["md".to_string(), "txt".to_string()]);
        let skips = scan.effective_skip_dirs();
        assert!(skips.contains("private"));
        assert!(skips.contains("out_reports"));
        assert!(!skips.contains("node_modules"));
        assert_eq!(scan.max_reports, Some(3));
    }

    #[test]
    fn rejects_zero_retention() {
        assert!(Config::from_toml_str("[scan]\nmax_reports = 0\n").is_err());
    }

    #[test]
    fn classifier_tables_parse() {
        let cfg = Config::from_toml_str(
            r#"
            [[classifier.categories]]
            keyword = "physik"
            label = "Physik"
            "#,
        )
        .expect("config");
        let c = cfg.classifier().expect("classifier");
        assert_eq!(c.categories.expect("categories")[0].label, "Physik");
        assert!(c.topics.is_none());
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("TEXT".parse::<ScanMode>().expect("mode"), ScanMode::Text);
        assert!("pdf".parse::<ScanMode>().is_err());
    }

    #[test]
    fn resolve_relative_against_base() {
        let base = Path::new("/data");
        assert_eq!(resolve_with_base(base, "docs"), PathBuf::from("/data/docs"));
        assert_eq!(resolve_with_base(base, "/abs"), PathBuf::from("/abs"));
    }

    #[test]
    fn only_bare_results_dir_joins_denylist() {
        let bare = ScanSettings::default();
        assert!(bare.effective_skip_dirs().contains("document_analysis"));

        let nested = ScanSettings { results_dir: "out/reports".into(), ..ScanSettings::default() };
        let skips = nested.effective_skip_dirs();
        assert!(!skips.contains("out/reports"));
        assert!(!skips.contains("out"));
        assert_eq!(nested.results_path(Path::new("/data")), PathBuf::from("/data/out/reports"));
    }
}
