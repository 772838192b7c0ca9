//! Layered configuration loading
//!
//! Settings resolve with the priority order:
//! 1. `--config <path>` command-line argument (highest)
//! 2. `WORKSIFT_CONFIG` environment variable
//! 3. `./worksift.toml` in the working directory
//! 4. Compiled defaults (fallback)
//!
//! A missing or unparseable file degrades to the compiled defaults with a
//! warning rather than aborting: a half-configured run that produces output
//! beats one that refuses to start. Every field carries its own serde
//! default so a partial TOML file overrides only what it names.
//! `WORKSIFT_DATA_DIR` (or `--data-dir`) overrides the data root after the
//! file is applied.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "WORKSIFT_CONFIG";
/// Environment variable overriding the data root directory.
pub const DATA_DIR_ENV: &str = "WORKSIFT_DATA_DIR";
/// Config file probed in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "worksift.toml";

/// Pipeline settings, TOML-overridable field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Data root; raw/processed/external live underneath it.
    pub data_dir: PathBuf,

    /// First publication year collected (inclusive).
    pub start_year: i32,
    /// Last publication year in the collection filter (inclusive there);
    /// ranking tables load `start_year..end_year` end-exclusive.
    pub end_year: i32,

    /// OpenAlex API root.
    pub openalex_base_url: String,
    /// Contact address appended as `mailto` for the polite pool.
    pub mailto: Option<String>,
    /// Per-request timeout for single-work lookups, seconds.
    pub request_timeout_secs: u64,

    /// Search phrases OR-joined into the collection query.
    pub keywords: Vec<String>,
    /// Institution country codes counted as an EU affiliation.
    pub eu_countries: Vec<String>,
    /// Results per search page.
    pub per_page: u32,
    /// Page cap per collection run.
    pub max_pages: u32,
    /// Delay between search pages, milliseconds.
    pub page_delay_ms: u64,
    /// Delay after each single-work fetch during enrichment, milliseconds.
    pub work_delay_ms: u64,

    /// SCImago subject category embedded in the ranking file names.
    pub scimago_category: String,
    /// Region qualifiers probed per year, in order.
    pub scimago_regions: Vec<String>,
    /// Indexing registry file, relative to the external data directory.
    pub scopus_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from("data"),
            start_year: 2020,
            end_year: 2025,
            openalex_base_url: "https://api.openalex.org".to_string(),
            mailto: None,
            request_timeout_secs: 20,
            keywords: default_keywords(),
            eu_countries: default_eu_countries(),
            per_page: 200,
            max_pages: 50,
            page_delay_ms: 500,
            work_delay_ms: 150,
            scimago_category: "Artificial Intelligence".to_string(),
            scimago_regions: vec!["Eastern Europe".to_string(), "Western Europe".to_string()],
            scopus_file: PathBuf::from("Scopus Source/scopus_sources.csv"),
        }
    }
}

impl Settings {
    /// Resolve settings from the layered sources.
    ///
    /// `cli_config` and `cli_data_dir` come from the command line and take
    /// priority over their environment counterparts. Never fails; the worst
    /// outcome is compiled defaults plus a warning.
    pub fn load(cli_config: Option<&Path>, cli_data_dir: Option<&Path>) -> Settings {
        let mut settings = match resolve_config_path(cli_config) {
            Some(path) => Settings::from_file(&path),
            None => {
                debug!("No config file found, using compiled defaults");
                Settings::default()
            }
        };

        if let Some(dir) = cli_data_dir {
            settings.data_dir = dir.to_path_buf();
        } else if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            settings.data_dir = PathBuf::from(dir);
        }

        settings
    }

    /// Load from one TOML file, warning and defaulting on any failure.
    pub fn from_file(path: &Path) -> Settings {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Settings>(&content) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Loaded config file");
                    settings
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Config file unparseable, using defaults");
                    Settings::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config file unreadable, using defaults");
                Settings::default()
            }
        }
    }

    /// Collector snapshot directory.
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    /// Processed table directory (`works_all.csv` and the datasets).
    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    /// Reference table directory (Scopus registry, SCImago rankings).
    pub fn external_dir(&self) -> PathBuf {
        self.data_dir.join("external")
    }

    /// Absolute path of the indexing registry file.
    pub fn scopus_path(&self) -> PathBuf {
        self.external_dir().join(&self.scopus_file)
    }

    /// Directory holding the per-year ranking files.
    pub fn scimago_dir(&self) -> PathBuf {
        self.external_dir().join("SCImago")
    }

    /// Years for which ranking tables are loaded (end-exclusive).
    pub fn scimago_years(&self) -> std::ops::Range<i32> {
        self.start_year..self.end_year
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn work_delay(&self) -> Duration {
        Duration::from_millis(self.work_delay_ms)
    }
}

/// Pick the config file per the priority order, if any candidate exists.
fn resolve_config_path(cli_config: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: command-line argument
    if let Some(path) = cli_config {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "Config file from --config does not exist, using defaults");
        return None;
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        warn!(path = %path.display(), "Config file from {} does not exist, using defaults", CONFIG_ENV);
        return None;
    }

    // Priority 3: working-directory file
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    None
}

fn default_eu_countries() -> Vec<String> {
    [
        "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE",
        "IT", "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_keywords() -> Vec<String> {
    [
        "artificial intelligence education",
        "AI education",
        "machine learning education",
        "deep learning education",
        "neural network education",
        "computer vision education",
        "natural language processing education",
        "intelligent tutoring system",
        "adaptive learning system",
        "educational data mining",
        "learning analytics",
        "artificial intelligence",
        "machine learning",
        "AI",
        "deep learning",
        "neural network",
        "computer vision",
        "natural language processing",
        "reinforcement learning",
        "generative AI",
        "ChatGPT",
        "education",
        "educational technology",
        "edtech",
        "digital learning",
        "online education",
        "e-learning",
        "educational software",
        "learning system",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
