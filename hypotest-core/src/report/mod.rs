use std::io::{self, Write};

use serde::Serialize;
use thiserror::Error;

use crate::runner::{HypothesisTestRunner, RunOutcome, TestResult};
use crate::stats::{variance, QuantileFunction, Sample, TwoSampleTest};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Descriptive statistics of one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SampleSummary {
    pub fn of(sample: &Sample) -> Self {
        let values = sample.as_slice();
        let mean_value = sample.mean();
        let std_dev = match mean_value {
            Some(m) if values.len() >= 2 => Some(variance(values, m).sqrt()),
            _ => None,
        };
        let min = values.iter().copied().reduce(f64::min);
        let max = values.iter().copied().reduce(f64::max);

        SampleSummary {
            count: values.len(),
            mean: mean_value,
            std_dev,
            min,
            max,
        }
    }
}

/// Everything a reporter prints about one test run.
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub test: String,
    pub alpha: f64,
    pub sample1: SampleSummary,
    pub sample2: SampleSummary,
    pub result: TestResult,
    pub outcome: RunOutcome,
    pub message: String,
}

impl TestReport {
    /// Build a report from a runner after [`HypothesisTestRunner::run`].
    pub fn new<T: TwoSampleTest, Q: QuantileFunction>(
        runner: &HypothesisTestRunner<T, Q>,
        outcome: RunOutcome,
    ) -> Self {
        TestReport {
            test: runner.test_name().to_string(),
            alpha: runner.config().alpha(),
            sample1: SampleSummary::of(runner.sample1()),
            sample2: SampleSummary::of(runner.sample2()),
            result: *runner.result(),
            outcome,
            message: outcome.to_string(),
        }
    }
}

pub trait Reporter: Send + Sync {
    /// Write the report to the given writer.
    fn report_to(&self, report: &TestReport, writer: &mut dyn Write) -> Result<(), ReportError>;

    /// Write the report to standard output.
    fn report(&self, report: &TestReport) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.report_to(report, &mut handle)?;
        handle.flush()?;
        Ok(())
    }
}

mod json;
mod terminal;
pub use json::JsonReporter;
pub use terminal::TerminalReporter;
