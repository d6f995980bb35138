use std::io::Write;

use colored::Colorize;

use super::{ReportError, Reporter, SampleSummary, TestReport};
use crate::runner::{RunOutcome, Verdict};

/// A reporter that outputs the test result to the terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalReporter {
    /// Whether to use colors in output (defaults to true).
    use_colors: bool,
}

impl TerminalReporter {
    /// Create a new terminal reporter with default settings.
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Create a terminal reporter with color output disabled.
    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    fn format_value(value: Option<f64>) -> String {
        match value {
            Some(v) if v != 0.0 && v.abs() < 1e-4 => format!("{:.4e}", v),
            Some(v) => format!("{:.6}", v),
            None => "n/a".to_string(),
        }
    }

    fn format_sample(summary: &SampleSummary) -> String {
        format!(
            "{} (n = {}, std dev {})",
            Self::format_value(summary.mean),
            summary.count,
            Self::format_value(summary.std_dev)
        )
    }

    /// Format the result line with appropriate coloring.
    fn format_outcome(&self, outcome: &RunOutcome) -> String {
        let text = outcome.as_str();
        if !self.use_colors {
            return text.to_string();
        }
        match outcome {
            RunOutcome::Completed(Verdict::Reject) => text.green().bold().to_string(),
            RunOutcome::Completed(Verdict::FailToReject) => text.yellow().to_string(),
            RunOutcome::Failed => text.red().bold().to_string(),
        }
    }
}

impl Reporter for TerminalReporter {
    fn report_to(&self, report: &TestReport, writer: &mut dyn Write) -> Result<(), ReportError> {
        let result = &report.result;

        writeln!(writer, "Test: {} (alpha = {})", report.test, report.alpha)?;
        writeln!(
            writer,
            "Sample 1 mean: {}",
            Self::format_sample(&report.sample1)
        )?;
        writeln!(
            writer,
            "Sample 2 mean: {}",
            Self::format_sample(&report.sample2)
        )?;
        writeln!(
            writer,
            "Test statistic: {}",
            Self::format_value(result.statistic())
        )?;
        writeln!(writer, "p-value: {}", Self::format_value(result.p_value()))?;
        writeln!(
            writer,
            "Critical value: {}",
            Self::format_value(result.critical_value())
        )?;
        writeln!(writer, "Result: {}", self.format_outcome(&report.outcome))?;

        Ok(())
    }
}
