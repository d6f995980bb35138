//! Command-line interface for hypotest.

use crate::config::{Config, OutputFormat};
use clap::Parser;
use hypotest_core::TestVariant;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hypotest")]
#[command(about = "Compare the means of two samples with a two-sample t-test")]
#[command(version)]
pub struct Cli {
    /// File with the first sample (generated from the config when omitted)
    #[arg(long, requires = "sample2")]
    pub sample1: Option<PathBuf>,

    /// File with the second sample
    #[arg(long, requires = "sample1")]
    pub sample2: Option<PathBuf>,

    /// Significance level (0.0-1.0, exclusive)
    #[arg(short, long)]
    pub alpha: Option<f64>,

    /// Test variant: student or welch
    #[arg(long)]
    pub test: Option<TestVariant>,

    /// Seed for generated samples
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of observations per generated sample
    #[arg(long)]
    pub size: Option<usize>,

    /// Report format: text or json
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Log file to append to (empty to log to stderr)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to config file (defaults to .hypotest.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether both samples are read from files instead of generated.
    pub fn has_sample_files(&self) -> bool {
        self.sample1.is_some() && self.sample2.is_some()
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI arguments take precedence over config file values.
    /// Only non-None optional values will override the config.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(alpha) = self.alpha {
            config.hypothesis.alpha = alpha;
        }

        if let Some(test) = self.test {
            config.hypothesis.test = test;
        }

        if let Some(seed) = self.seed {
            config.generation.seed = seed;
        }

        if let Some(size) = self.size {
            config.generation.size = size;
        }

        if let Some(format) = self.format {
            config.output.format = format;
        }

        if let Some(log_file) = &self.log_file {
            config.logging.file = log_file.clone();
        }

        if self.no_color {
            config.output.color = false;
        }

        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}
