//! Configuration loading for hypotest.
//!
//! Supports loading configuration from TOML files, with sensible defaults
//! for all settings.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use hypotest_core::{TestConfiguration, TestVariant};
use serde::{Deserialize, Serialize};

/// Top-level configuration for hypotest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for the hypothesis test itself.
    pub hypothesis: HypothesisConfig,
    /// Settings for generating demo samples when no input files are given.
    pub generation: GenerationConfig,
    /// Settings for the log sink.
    pub logging: LoggingConfig,
    /// Settings for the printed report.
    pub output: OutputConfig,
}

/// Configuration for the hypothesis test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HypothesisConfig {
    /// Significance level, strictly between 0 and 1.
    pub alpha: f64,
    /// Which t-test variant computes the statistic.
    pub test: TestVariant,
}

/// Configuration for generated normal samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed for the random number generator.
    pub seed: u64,
    /// Number of observations in each sample.
    pub size: usize,
    pub mean1: f64,
    pub std_dev1: f64,
    pub mean2: f64,
    pub std_dev2: f64,
}

/// Configuration for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file to append to. An empty string logs to stderr.
    pub file: String,
    /// Filter directive, e.g. "info" or "hypotest_core=debug".
    pub level: String,
}

/// Configuration for the printed report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Whether to use colors in terminal output.
    pub color: bool,
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format '{other}', expected 'text' or 'json'"
            )),
        }
    }
}

impl Default for HypothesisConfig {
    fn default() -> Self {
        Self {
            alpha: TestConfiguration::DEFAULT_ALPHA,
            test: TestVariant::Student,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            size: 100,
            mean1: 10.0,
            std_dev1: 2.0,
            mean2: 12.0,
            std_dev2: 2.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "z_test.log".to_string(),
            level: "info".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

/// Default configuration file name.
const DEFAULT_CONFIG_FILE: &str = ".hypotest.toml";

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from the default file (`.hypotest.toml`) or use defaults.
    ///
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load_or_default() -> Result<Config> {
        let path = Path::new(DEFAULT_CONFIG_FILE);

        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from the specified path, or try the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the specified file cannot be read or parsed.
    pub fn load_from(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load_or_default(),
        }
    }
}
