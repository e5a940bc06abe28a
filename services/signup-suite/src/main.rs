//! Signup API Suite - Main Entry Point
//!
//! Runs the signup and OTP suite against the configured environment and exits
//! with 0 when every test passed, 1 on failures and 2 when interrupted.

use std::sync::Arc;

use anyhow::Context;
use harness_common::{HarnessConfig, init_tracing};
use signup_suite::readme::{self, RunFacts};
use signup_suite::shutdown::interrupt_on_signal;
use signup_suite::{JsonLinesSink, Runner, signup_suite};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HarnessConfig::from_env().context("invalid harness configuration")?;
    init_tracing(&config.tracing_config());
    config.log_summary();

    let facts = RunFacts {
        workers: config.parallel_workers,
        retries: config.retry_count,
    };
    let readme_path = config.readme_path.clone();

    let mut runner = Runner::new(config.clone());
    if let Some(dir) = &config.results_dir {
        let sink = JsonLinesSink::create(dir)
            .with_context(|| format!("failed to open results in {}", dir.display()))?;
        info!(path = %sink.path().display(), "Writing test reports");
        runner = runner.with_sink(Arc::new(sink));
    }

    let signals = interrupt_on_signal(runner.control());
    let summary = runner.run(signup_suite()).await?;
    signals.abort();
    summary.log();

    if let Some(path) = readme_path {
        readme::update_file_logged(&path, &summary, facts);
    }

    std::process::exit(summary.exit_code());
}
