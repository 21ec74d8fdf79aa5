//! TOML run configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! runnable configuration. CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use codal_core::data::{SourceSettings, SyntheticGenerator, DEFAULT_DAYS_BACK, DEFAULT_REPORT_COUNT};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration: where to fetch from and how much to process.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub source: SourceConfig,
    pub run: RunConfig,
}

/// `[source]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub page_size: u32,
    pub days_back: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let settings = SourceSettings::default();
        Self {
            base_url: settings.base_url,
            timeout_secs: settings.timeout.as_secs(),
            user_agent: settings.user_agent,
            page_size: settings.page_size,
            days_back: DEFAULT_DAYS_BACK,
        }
    }
}

impl SourceConfig {
    /// Connection settings for the HTTP provider.
    pub fn settings(&self) -> SourceSettings {
        SourceSettings {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            page_size: self.page_size,
        }
    }
}

/// `[run]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Only the first N companies of the list get their reports fetched.
    pub max_companies: usize,
    pub output_dir: PathBuf,
    /// Records generated per symbol when a report fetch falls back.
    pub synthetic_reports: usize,
    /// Master seed for fallback data. Unset means entropy.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_companies: 5,
            output_dir: PathBuf::from("output"),
            synthetic_reports: DEFAULT_REPORT_COUNT,
            seed: None,
        }
    }
}

impl RunConfig {
    pub fn generator(&self) -> SyntheticGenerator {
        SyntheticGenerator::new(self.seed).with_report_count(self.synthetic_reports)
    }
}

impl AnalyzerConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AnalyzerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("source.base_url must not be empty".into()));
        }
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Invalid("source.timeout_secs must be > 0".into()));
        }
        if self.source.page_size == 0 {
            return Err(ConfigError::Invalid("source.page_size must be > 0".into()));
        }
        if self.run.max_companies == 0 {
            return Err(ConfigError::Invalid("run.max_companies must be > 0".into()));
        }
        if self.run.synthetic_reports == 0 {
            return Err(ConfigError::Invalid("run.synthetic_reports must be > 0".into()));
        }
        Ok(())
    }
}
