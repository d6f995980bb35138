use anyhow::{Context, Result};
use clap::Parser;
use hypotest::{
    generate_samples, logging, read_sample, Cli, Config, HypothesisTestRunner, JsonReporter,
    OutputFormat, Reporter, StandardNormal, TerminalReporter, TestConfiguration, TestReport,
};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config and apply CLI overrides
    let mut config = Config::load_from(cli.config.as_deref())?;
    cli.apply_to_config(&mut config);

    logging::init(&config.logging).context("Failed to initialize logging")?;
    debug!(?config, "configuration");

    // 1. Collect samples
    let (sample1, sample2) = match (&cli.sample1, &cli.sample2) {
        (Some(path1), Some(path2)) => (
            read_sample(path1).context("Failed to read sample 1")?,
            read_sample(path2).context("Failed to read sample 2")?,
        ),
        _ => generate_samples(&config.generation).context("Failed to generate samples")?,
    };
    debug!(
        from_files = cli.has_sample_files(),
        n1 = sample1.len(),
        n2 = sample2.len(),
        "collected samples"
    );

    // 2. Run the test
    let test_config =
        TestConfiguration::new(config.hypothesis.alpha).context("Invalid significance level")?;
    let mut runner = HypothesisTestRunner::with_providers(
        sample1,
        sample2,
        test_config,
        config.hypothesis.test,
        StandardNormal,
    );
    let outcome = runner.run();

    // 3. Report results
    let report = TestReport::new(&runner, outcome);
    let reporter: Box<dyn Reporter> = match config.output.format {
        OutputFormat::Json => Box::new(JsonReporter::new()),
        OutputFormat::Text if config.output.color => Box::new(TerminalReporter::new()),
        OutputFormat::Text => Box::new(TerminalReporter::without_colors()),
    };
    reporter.report(&report)?;

    Ok(())
}
