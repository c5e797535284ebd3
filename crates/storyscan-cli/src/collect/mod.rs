//! The `run` command: load identifiers, scrape with retries, export, summarize.
//!
//! Per-identifier failures are recorded in the store and retried rather than
//! propagated, so a single bad account never aborts the run. Store and
//! configuration errors are fatal.

mod batch;
mod retry;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use sqlx::SqlitePool;
use storyscan_db::ScrapeRunRow;
use storyscan_scraper::{Pacing, StoryClient};

use crate::fail_run_best_effort;

use retry::FinalReport;

#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub max_rounds: u32,
}

/// Scrapes every identifier in `options.input` and writes the report.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the HTTP client cannot be
/// built, the store fails, or the report cannot be written. Once the run row
/// exists, a failure before completion marks it `failed`.
pub(crate) async fn run_scrape(
    pool: &SqlitePool,
    config: &storyscan_core::AppConfig,
    options: &RunOptions,
) -> anyhow::Result<()> {
    let started = Instant::now();

    let identifiers =
        storyscan_report::load_identifiers(&options.input, config.input_sheet.as_deref())
            .with_context(|| format!("loading identifiers from {}", options.input.display()))?;
    if identifiers.is_empty() {
        println!(
            "no identifiers found in {}; skipping run creation",
            options.input.display()
        );
        return Ok(());
    }

    let client = StoryClient::from_config(config).context("building story client")?;
    let pacing = Pacing::from_config(config);

    let total = i64::try_from(identifiers.len()).unwrap_or(i64::MAX);
    let run = storyscan_db::create_scrape_run(pool, "cli", total).await?;
    if let Err(e) = storyscan_db::start_scrape_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }
    tracing::info!(run_id = run.id, identifiers = identifiers.len(), "scrape run started");

    let report = match retry::run_rounds(
        pool,
        &client,
        pacing,
        run.id,
        &identifiers,
        options.max_rounds,
    )
    .await
    {
        Ok(report) => report,
        Err(e) => {
            fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
            return Err(e);
        }
    };

    if let Err(e) = storyscan_db::complete_scrape_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    let finished = storyscan_db::get_scrape_run(pool, run.id).await?;
    tracing::info!(
        run_id = finished.id,
        status = %finished.status,
        rounds = finished.rounds_executed,
        success = report.total_success(),
        fail = report.total_fail(),
        "scrape run finished"
    );

    crate::export::run_export(pool, config, &options.output).await?;
    print_summary(&finished, &report, started.elapsed(), &options.output);
    Ok(())
}

fn print_summary(run: &ScrapeRunRow, report: &FinalReport, elapsed: Duration, output: &Path) {
    println!();
    println!("🆔 Run: #{} ({})", run.id, run.status);
    println!("📊 Total Success: {}", report.total_success());
    println!("❌ Total Fail: {}", report.total_fail());
    println!("🔁 Rounds: {}", report.rounds_executed);
    println!("🕒 Time Taken: {} seconds", elapsed.as_secs());
    println!("📁 Excel Saved as: {}", output.display());
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
