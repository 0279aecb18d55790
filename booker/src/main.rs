use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;

use booker::{
    config::AppConfig,
    execution::attempt::AttemptRunner,
    metrics::counters::Counters,
    platform::HttpPlatform,
    schedule::JsonScheduleStore,
    scheduler::{PassOutcome, PassReport, RetryScheduler},
    time::SystemClock,
};
use common::logger::init_tracing;

#[derive(Debug, Parser)]
#[clap(name = "booker", version)]
struct Cli {
    /// Treat this date (YYYY-MM-DD) as today
    #[clap(long, env = "FORCE_DATE")]
    today: Option<NaiveDate>,

    /// Plan and log only; no platform calls and no schedule writes.
    /// `DRY_RUN` accepts the usual truthy/falsey spellings (1, yes, false, ...)
    #[clap(long, env = "DRY_RUN", value_parser = clap::builder::FalseyValueParser::new())]
    dry_run: bool,

    /// Schedule file (overrides BOOKER_SCHEDULE_FILE)
    #[clap(long)]
    schedule_file: Option<PathBuf>,
}

async fn run(cli: Cli) -> anyhow::Result<PassReport> {
    let mut cfg = AppConfig::from_env().context("loading configuration")?;
    if let Some(path) = cli.schedule_file {
        cfg.schedule_file = path;
    }

    tracing::info!(
        schedule = %cfg.schedule_file.display(),
        timezone = %cfg.timezone,
        dry_run = cli.dry_run,
        "starting booking pass"
    );

    let platform_cfg = Arc::new(cfg.platform.clone());
    let platform = Arc::new(HttpPlatform::new(platform_cfg.clone()));
    let runner = AttemptRunner::new(platform, platform_cfg, cfg.pacing.clone())?;

    let scheduler = RetryScheduler::new(
        Arc::new(JsonScheduleStore::new(cfg.schedule_file.clone())),
        runner,
        Arc::new(SystemClock::new(cfg.timezone)),
        cfg.scheduler.clone(),
        Counters::default(),
        cli.dry_run,
    );

    scheduler.run_pass(cli.today).await
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing("booker", is_production);

    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            for b in &report.bookings {
                match &b.outcome {
                    PassOutcome::Unbooked { stage, reason } => {
                        tracing::warn!(booking_id = %b.id, stage = %stage, reason = %reason, "unbooked")
                    }
                    outcome => tracing::info!(booking_id = %b.id, outcome = ?outcome, attempts = b.attempts, "booking outcome"),
                }
            }
            if report.unbooked_count() > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            tracing::error!(error = ?e, "booking pass aborted");
            ExitCode::from(2)
        }
    }
}
