//! hypotest: two-sample mean comparison from the command line
//!
//! This library wires the core test runner to configuration files, sample
//! input and generation, and the process-wide log sink.

pub mod cli;
pub mod config;
pub mod generate;
pub mod input;
pub mod logging;

// Re-export core types for convenience
pub use hypotest_core::report::{
    JsonReporter, ReportError, Reporter, SampleSummary, TerminalReporter, TestReport,
};
pub use hypotest_core::runner::{
    ConfigurationError, HypothesisTestRunner, RunOutcome, Stage, StateError, TestConfiguration,
    TestError, TestResult, Verdict, RUN_ERROR_MESSAGE,
};
pub use hypotest_core::stats::{
    ComputationError, Sample, StandardNormal, StudentTTest, TestVariant, TwoSampleTest,
    WelchTTest,
};

// Re-export main types from this crate
pub use cli::Cli;
pub use config::{Config, OutputFormat};
pub use generate::{generate_samples, GenerateError};
pub use input::{read_sample, InputError};
