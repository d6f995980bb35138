//! Core types and the test runner for hypotest.
//!
//! This crate provides the two-sample mean comparison used by the hypotest
//! CLI: the statistics and distribution providers, the runner that sequences
//! them, and reporters for its results.

pub mod report;
pub mod runner;
pub mod stats;

// Re-export main types for convenience
pub use report::{JsonReporter, ReportError, Reporter, SampleSummary, TerminalReporter, TestReport};
pub use runner::{
    ConfigurationError, HypothesisTestRunner, RunOutcome, Stage, StateError, TestConfiguration,
    TestError, TestResult, Verdict, RUN_ERROR_MESSAGE,
};
pub use stats::{
    ComputationError, QuantileFunction, Sample, SampleId, StandardNormal, StudentTTest,
    TestOutcome, TestVariant, TwoSampleTest, WelchTTest,
};
