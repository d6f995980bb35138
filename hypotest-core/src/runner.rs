//! Orchestration of a two-sample mean comparison.
//!
//! [`HypothesisTestRunner`] computes the statistic, the p-value and the
//! critical value through its providers, then compares the p-value against
//! alpha. The individual steps return precise errors; [`HypothesisTestRunner::run`]
//! wraps the whole sequence in a single error boundary that logs the failure
//! and reports a fixed message instead.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::stats::{
    ComputationError, QuantileFunction, Sample, StandardNormal, StudentTTest, TestOutcome,
    TwoSampleTest,
};

/// Message returned by [`HypothesisTestRunner::run`] when any step fails.
pub const RUN_ERROR_MESSAGE: &str =
    "Error occurred during hypothesis test. Please check the input data.";

const REJECT_MESSAGE: &str = concat!(
    "reject the null hypothesis — ",
    "significant difference detected between the two means."
);

const FAIL_TO_REJECT_MESSAGE: &str = concat!(
    "fail to reject the null hypothesis — ",
    "no significant difference detected between the two means."
);

/// Invalid test parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("alpha must be between 0 and 1 (exclusive), got {0}")]
    AlphaOutOfRange(f64),
}

/// A step was invoked before the step it depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("the test statistic has not been computed yet")]
    StatisticNotComputed,
    #[error("the p-value has not been computed yet")]
    PValueNotComputed,
}

/// Any error raised while running a hypothesis test.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TestError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Computation(#[from] ComputationError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// Parameters of a hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestConfiguration {
    alpha: f64,
}

impl TestConfiguration {
    pub const DEFAULT_ALPHA: f64 = 0.05;

    /// Create a configuration with the given significance level.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::AlphaOutOfRange`] unless `0 < alpha < 1`.
    pub fn new(alpha: f64) -> Result<Self, ConfigurationError> {
        if alpha > 0.0 && alpha < 1.0 {
            Ok(Self { alpha })
        } else {
            Err(ConfigurationError::AlphaOutOfRange(alpha))
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Probability at which the two-tailed critical value is looked up.
    pub fn critical_probability(&self) -> f64 {
        1.0 - self.alpha / 2.0
    }
}

impl Default for TestConfiguration {
    fn default() -> Self {
        Self {
            alpha: Self::DEFAULT_ALPHA,
        }
    }
}

/// Decision of a hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Reject,
    FailToReject,
}

impl Verdict {
    /// Reject exactly when the p-value is strictly below alpha.
    pub fn decide(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Verdict::Reject
        } else {
            Verdict::FailToReject
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Reject => REJECT_MESSAGE,
            Verdict::FailToReject => FAIL_TO_REJECT_MESSAGE,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values computed by a runner. Every field is `None` until its step ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TestResult {
    statistic: Option<f64>,
    p_value: Option<f64>,
    critical_value: Option<f64>,
    verdict: Option<Verdict>,
}

impl TestResult {
    pub fn statistic(&self) -> Option<f64> {
        self.statistic
    }

    pub fn p_value(&self) -> Option<f64> {
        self.p_value
    }

    pub fn critical_value(&self) -> Option<f64> {
        self.critical_value
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }
}

/// Progress of a runner through the test sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Created,
    StatisticComputed,
    PValueComputed,
    CriticalValueComputed,
    Verdicted,
    Failed,
}

/// What [`HypothesisTestRunner::run`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(Verdict),
    Failed,
}

impl RunOutcome {
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            RunOutcome::Completed(verdict) => Some(*verdict),
            RunOutcome::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Completed(verdict) => verdict.as_str(),
            RunOutcome::Failed => RUN_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached values of one pass through the sequence.
#[derive(Debug, Clone, Copy, Default)]
struct Evaluation {
    outcome: Option<TestOutcome>,
    result: TestResult,
}

impl Evaluation {
    fn statistic<T: TwoSampleTest>(
        &mut self,
        test: &T,
        sample1: &Sample,
        sample2: &Sample,
    ) -> Result<f64, TestError> {
        let outcome = test.test(sample1.as_slice(), sample2.as_slice())?;
        debug!(test = test.name(), statistic = outcome.statistic, "computed test statistic");
        self.outcome = Some(outcome);
        self.result.statistic = Some(outcome.statistic);
        Ok(outcome.statistic)
    }

    fn p_value(&mut self) -> Result<f64, TestError> {
        let outcome = self.outcome.ok_or(StateError::StatisticNotComputed)?;
        debug!(p_value = outcome.p_value, "computed p-value");
        self.result.p_value = Some(outcome.p_value);
        Ok(outcome.p_value)
    }

    fn critical_value<Q: QuantileFunction>(
        &mut self,
        quantile: &Q,
        config: &TestConfiguration,
    ) -> Result<f64, TestError> {
        if self.result.p_value.is_none() {
            return Err(StateError::PValueNotComputed.into());
        }
        let critical = quantile.quantile(config.critical_probability())?;
        debug!(critical_value = critical, "computed critical value");
        self.result.critical_value = Some(critical);
        Ok(critical)
    }

    fn verdict(&mut self, config: &TestConfiguration) -> Result<Verdict, StateError> {
        let p_value = self.result.p_value.ok_or(StateError::PValueNotComputed)?;
        let verdict = Verdict::decide(p_value, config.alpha());
        self.result.verdict = Some(verdict);
        Ok(verdict)
    }
}

/// Runs a two-sample mean comparison over two samples.
///
/// The statistics provider defaults to [`StudentTTest`] and the critical
/// value is looked up in the [`StandardNormal`] distribution.
pub struct HypothesisTestRunner<T = StudentTTest, Q = StandardNormal> {
    sample1: Sample,
    sample2: Sample,
    config: TestConfiguration,
    test: T,
    quantile: Q,
    evaluation: Evaluation,
    failed: bool,
}

impl HypothesisTestRunner {
    /// Create a runner with the default providers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::AlphaOutOfRange`] unless `0 < alpha < 1`.
    pub fn new(
        sample1: impl Into<Sample>,
        sample2: impl Into<Sample>,
        alpha: f64,
    ) -> Result<Self, ConfigurationError> {
        let config = TestConfiguration::new(alpha)?;
        Ok(Self::with_providers(
            sample1,
            sample2,
            config,
            StudentTTest,
            StandardNormal,
        ))
    }
}

impl<T: TwoSampleTest, Q: QuantileFunction> HypothesisTestRunner<T, Q> {
    /// Create a runner with explicit statistics and distribution providers.
    pub fn with_providers(
        sample1: impl Into<Sample>,
        sample2: impl Into<Sample>,
        config: TestConfiguration,
        test: T,
        quantile: Q,
    ) -> Self {
        Self {
            sample1: sample1.into(),
            sample2: sample2.into(),
            config,
            test,
            quantile,
            evaluation: Evaluation::default(),
            failed: false,
        }
    }

    pub fn sample1(&self) -> &Sample {
        &self.sample1
    }

    pub fn sample2(&self) -> &Sample {
        &self.sample2
    }

    pub fn config(&self) -> &TestConfiguration {
        &self.config
    }

    pub fn test_name(&self) -> &'static str {
        self.test.name()
    }

    pub fn result(&self) -> &TestResult {
        &self.evaluation.result
    }

    pub fn stage(&self) -> Stage {
        if self.failed {
            return Stage::Failed;
        }
        let result = &self.evaluation.result;
        if result.verdict.is_some() {
            Stage::Verdicted
        } else if result.critical_value.is_some() {
            Stage::CriticalValueComputed
        } else if result.p_value.is_some() {
            Stage::PValueComputed
        } else if result.statistic.is_some() {
            Stage::StatisticComputed
        } else {
            Stage::Created
        }
    }

    /// Compute and cache the test statistic.
    pub fn compute_statistic(&mut self) -> Result<f64, TestError> {
        let computed = self
            .evaluation
            .statistic(&self.test, &self.sample1, &self.sample2);
        self.track(computed)
    }

    /// Cache and return the p-value of the test computed by [`Self::compute_statistic`].
    pub fn compute_p_value(&mut self) -> Result<f64, TestError> {
        let computed = self.evaluation.p_value();
        self.track(computed)
    }

    /// Compute and cache the two-tailed critical value at `1 - alpha/2`.
    pub fn compute_critical_value(&mut self) -> Result<f64, TestError> {
        let computed = self
            .evaluation
            .critical_value(&self.quantile, &self.config);
        self.track(computed)
    }

    /// Compare the cached p-value with alpha.
    pub fn verdict(&mut self) -> Result<Verdict, StateError> {
        self.evaluation.verdict(&self.config)
    }

    /// Run every step in order and commit the results together.
    ///
    /// Unlike [`Self::run`], errors are returned to the caller unmodified.
    pub fn try_run(&mut self) -> Result<&TestResult, TestError> {
        match self.evaluate() {
            Ok(evaluation) => {
                self.evaluation = evaluation;
                Ok(&self.evaluation.result)
            }
            Err(e) => {
                self.evaluation = Evaluation::default();
                self.failed = true;
                Err(e)
            }
        }
    }

    /// Run the test, logging and summarizing any failure.
    ///
    /// Returns the verdict, or [`RunOutcome::Failed`] (displayed as
    /// [`RUN_ERROR_MESSAGE`]) if any step failed. A failed runner stays failed.
    pub fn run(&mut self) -> RunOutcome {
        if self.failed {
            debug!("runner already failed, not retrying");
            return RunOutcome::Failed;
        }

        let test = self.test.name();
        match self.try_run() {
            Ok(result) => {
                info!(
                    test = test,
                    statistic = ?result.statistic,
                    p_value = ?result.p_value,
                    "Two-sample test completed successfully."
                );
                match result.verdict {
                    Some(verdict) => RunOutcome::Completed(verdict),
                    None => RunOutcome::Failed,
                }
            }
            Err(e) => {
                error!(test = test, "Error occurred during hypothesis test: {}", e);
                RunOutcome::Failed
            }
        }
    }

    fn evaluate(&self) -> Result<Evaluation, TestError> {
        let mut scratch = Evaluation::default();
        scratch.statistic(&self.test, &self.sample1, &self.sample2)?;
        scratch.p_value()?;
        scratch.critical_value(&self.quantile, &self.config)?;
        scratch.verdict(&self.config)?;
        Ok(scratch)
    }

    fn track<V>(&mut self, computed: Result<V, TestError>) -> Result<V, TestError> {
        if let Err(TestError::Computation(_)) = &computed {
            self.failed = true;
        }
        computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    const NEAR_TEN: [f64; 5] = [10.1, 9.8, 10.3, 9.9, 10.0];
    const NEAR_TWELVE: [f64; 5] = [12.0, 11.8, 12.2, 12.1, 11.9];

    /// Statistics provider returning a fixed p-value.
    struct FixedPValue(f64);

    impl TwoSampleTest for FixedPValue {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn test(&self, _: &[f64], _: &[f64]) -> Result<TestOutcome, ComputationError> {
            Ok(TestOutcome {
                statistic: 1.0,
                p_value: self.0,
                degrees_of_freedom: 1.0,
            })
        }
    }

    /// Quantile provider that always fails.
    struct BrokenQuantile;

    impl QuantileFunction for BrokenQuantile {
        fn quantile(&self, _: f64) -> Result<f64, ComputationError> {
            Err(ComputationError::Distribution("unavailable".to_string()))
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        (value, logs.contents())
    }

    fn fixed_runner(p_value: f64, alpha: f64) -> HypothesisTestRunner<FixedPValue> {
        HypothesisTestRunner::with_providers(
            NEAR_TEN,
            NEAR_TWELVE,
            TestConfiguration::new(alpha).unwrap(),
            FixedPValue(p_value),
            StandardNormal,
        )
    }

    #[test]
    fn test_alpha_bounds() {
        assert_eq!(
            TestConfiguration::new(0.0),
            Err(ConfigurationError::AlphaOutOfRange(0.0))
        );
        assert!(TestConfiguration::new(1.0).is_err());
        assert!(TestConfiguration::new(f64::NAN).is_err());
        assert!(HypothesisTestRunner::new(NEAR_TEN, NEAR_TWELVE, 0.0).is_err());
        assert!(HypothesisTestRunner::new(NEAR_TEN, NEAR_TWELVE, 1.0).is_err());
        assert_eq!(TestConfiguration::default().alpha(), 0.05);
    }

    #[test]
    fn test_clearly_different_means_reject() {
        let mut runner = HypothesisTestRunner::new(NEAR_TEN, NEAR_TWELVE, 0.05).unwrap();
        let outcome = runner.run();

        assert_eq!(outcome, RunOutcome::Completed(Verdict::Reject));
        assert!(outcome.to_string().starts_with("reject the null hypothesis"));

        let result = runner.result();
        assert!(result.statistic().unwrap() < -10.0);
        assert!(result.p_value().unwrap() < 1e-4);
        assert!((result.critical_value().unwrap() - 1.96).abs() < 0.001);
        assert_eq!(runner.stage(), Stage::Verdicted);
    }

    #[test]
    fn test_similar_means_fail_to_reject() {
        let mut runner =
            HypothesisTestRunner::new([10.0, 10.1, 9.9], [10.05, 9.95, 10.0], 0.05).unwrap();
        let outcome = runner.run();

        assert_eq!(outcome, RunOutcome::Completed(Verdict::FailToReject));
        assert!(outcome
            .to_string()
            .starts_with("fail to reject the null hypothesis"));
        assert!(runner.result().p_value().unwrap() > 0.5);
    }

    #[test]
    fn test_verdict_messages() {
        assert_eq!(
            Verdict::Reject.as_str(),
            "reject the null hypothesis — significant difference detected between the two means."
        );
        assert!(Verdict::FailToReject
            .as_str()
            .starts_with("fail to reject the null hypothesis — no significant difference"));
        assert_eq!(RunOutcome::Failed.as_str(), RUN_ERROR_MESSAGE);
    }

    #[test]
    fn test_decision_boundary() {
        let alpha = 0.05;
        let below = fixed_runner(alpha - 1e-12, alpha).run();
        let equal = fixed_runner(alpha, alpha).run();
        let above = fixed_runner(alpha + 1e-12, alpha).run();

        assert_eq!(below.verdict(), Some(Verdict::Reject));
        assert_eq!(equal.verdict(), Some(Verdict::FailToReject));
        assert_eq!(above.verdict(), Some(Verdict::FailToReject));
    }

    #[test]
    fn test_steps_are_idempotent() {
        let mut runner = HypothesisTestRunner::new(NEAR_TEN, NEAR_TWELVE, 0.05).unwrap();

        let s1 = runner.compute_statistic().unwrap();
        let p1 = runner.compute_p_value().unwrap();
        let c1 = runner.compute_critical_value().unwrap();
        let s2 = runner.compute_statistic().unwrap();
        let p2 = runner.compute_p_value().unwrap();
        let c2 = runner.compute_critical_value().unwrap();

        assert_eq!(s1, s2);
        assert_eq!(p1, p2);
        assert_eq!(c1, c2);
    }

    #[test]
    fn test_stage_progression() {
        let mut runner = HypothesisTestRunner::new(NEAR_TEN, NEAR_TWELVE, 0.05).unwrap();
        assert_eq!(runner.stage(), Stage::Created);

        runner.compute_statistic().unwrap();
        assert_eq!(runner.stage(), Stage::StatisticComputed);
        runner.compute_p_value().unwrap();
        assert_eq!(runner.stage(), Stage::PValueComputed);
        runner.compute_critical_value().unwrap();
        assert_eq!(runner.stage(), Stage::CriticalValueComputed);
        runner.verdict().unwrap();
        assert_eq!(runner.stage(), Stage::Verdicted);
    }

    #[test]
    fn test_out_of_order_steps() {
        let mut runner = HypothesisTestRunner::new(NEAR_TEN, NEAR_TWELVE, 0.05).unwrap();

        assert_eq!(runner.verdict(), Err(StateError::PValueNotComputed));
        assert_eq!(
            runner.compute_p_value(),
            Err(TestError::State(StateError::StatisticNotComputed))
        );

        let mut runner = HypothesisTestRunner::new(NEAR_TEN, NEAR_TWELVE, 0.05).unwrap();
        runner.compute_statistic().unwrap();
        assert_eq!(
            runner.compute_critical_value(),
            Err(TestError::State(StateError::PValueNotComputed))
        );
        assert_eq!(runner.verdict(), Err(StateError::PValueNotComputed));
        assert_eq!(runner.stage(), Stage::StatisticComputed);
    }

    #[test]
    fn test_empty_sample_run_and_direct_call() {
        let (outcome, logs) = with_captured_logs(|| {
            let mut runner =
                HypothesisTestRunner::new(Sample::default(), NEAR_TWELVE, 0.05).unwrap();
            let outcome = runner.run();
            assert_eq!(runner.stage(), Stage::Failed);
            assert_eq!(*runner.result(), TestResult::default());
            outcome
        });

        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(outcome.to_string(), RUN_ERROR_MESSAGE);
        assert_eq!(logs.lines().filter(|l| l.contains("ERROR")).count(), 1);
        assert!(logs.contains("sample 1 has 0 observation(s)"));

        let mut runner =
            HypothesisTestRunner::new(Sample::default(), NEAR_TWELVE, 0.05).unwrap();
        assert!(matches!(
            runner.compute_statistic(),
            Err(TestError::Computation(
                ComputationError::InsufficientObservations { .. }
            ))
        ));
    }

    #[test]
    fn test_overflowing_sample_fails_with_one_error_log() {
        let (outcome, logs) = with_captured_logs(|| {
            let mut runner =
                HypothesisTestRunner::new([1.7e308, 1.6e308, 1.5e308], [1.0, 2.0, 3.0], 0.05)
                    .unwrap();
            let outcome = runner.run();
            assert_eq!(runner.stage(), Stage::Failed);
            outcome
        });

        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(logs.lines().filter(|l| l.contains("ERROR")).count(), 1);
        assert!(logs.contains("too large to compare"));
    }

    #[test]
    fn test_success_is_logged_at_info() {
        let (_, logs) = with_captured_logs(|| {
            HypothesisTestRunner::new(NEAR_TEN, NEAR_TWELVE, 0.05)
                .unwrap()
                .run()
        });

        assert!(logs.contains("INFO"));
        assert!(logs.contains("Two-sample test completed successfully."));
        assert!(!logs.contains("ERROR"));
    }

    #[test]
    fn test_failed_runner_is_terminal() {
        let mut runner = HypothesisTestRunner::new([1.0], NEAR_TWELVE, 0.05).unwrap();
        assert!(runner.run().is_failed());
        assert!(runner.run().is_failed());

        // Direct calls still surface the precise error.
        assert!(matches!(
            runner.compute_statistic(),
            Err(TestError::Computation(_))
        ));
    }

    #[test]
    fn test_quantile_failure_discards_partial_results() {
        let mut runner = HypothesisTestRunner::with_providers(
            NEAR_TEN,
            NEAR_TWELVE,
            TestConfiguration::default(),
            StudentTTest,
            BrokenQuantile,
        );

        assert!(matches!(
            runner.try_run(),
            Err(TestError::Computation(ComputationError::Distribution(_)))
        ));
        assert_eq!(runner.result().statistic(), None);
        assert_eq!(runner.result().p_value(), None);
        assert_eq!(runner.stage(), Stage::Failed);
    }

    #[test]
    fn test_rerun_overwrites_results() {
        let mut runner = HypothesisTestRunner::new(NEAR_TEN, NEAR_TWELVE, 0.05).unwrap();
        let first = *runner.try_run().unwrap();
        let second = *runner.try_run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_outcome_shapes() {
        let shapes = [
            Verdict::Reject.as_str(),
            Verdict::FailToReject.as_str(),
            RUN_ERROR_MESSAGE,
        ];
        let inputs: [(Vec<f64>, Vec<f64>); 3] = [
            (NEAR_TEN.to_vec(), NEAR_TWELVE.to_vec()),
            (vec![1.0, 2.0, 3.0], vec![1.5, 2.5, 2.0]),
            (vec![f64::NAN, 1.0], vec![1.0, 2.0]),
        ];
        for (a, b) in inputs {
            let outcome = HypothesisTestRunner::new(a, b, 0.05).unwrap().run();
            assert!(shapes.contains(&outcome.as_str()));
        }
    }
}
