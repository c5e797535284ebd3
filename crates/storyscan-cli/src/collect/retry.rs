//! Bounded retry rounds over the run's outstanding failures.

use std::collections::BTreeSet;

use sqlx::SqlitePool;
use storyscan_scraper::{Pacing, ProfileFetcher};

use super::batch::{process_batch, BatchCounts};

/// Totals accumulated across every round of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FinalReport {
    pub initial_success: usize,
    pub initial_fail: usize,
    pub retry_success: usize,
    /// `process_batch` calls made, the initial pass included.
    pub rounds_executed: u32,
    /// Identifiers with no success in this run when the loop exited.
    pub still_failed: BTreeSet<String>,
}

impl FinalReport {
    #[must_use]
    pub fn total_success(&self) -> usize {
        self.initial_success + self.retry_success
    }

    #[must_use]
    pub fn total_fail(&self) -> usize {
        self.still_failed.len()
    }
}

/// Runs the initial pass, then resubmits outstanding failures until none
/// remain or `max_rounds` batches have run.
///
/// One `pacing` delay separates consecutive rounds, so every pair of
/// fetches in the run is paced.
///
/// `max_rounds` is clamped to at least one.
pub(crate) async fn run_rounds<F>(
    pool: &SqlitePool,
    fetcher: &F,
    pacing: Pacing,
    run_id: i64,
    identifiers: &[String],
    max_rounds: u32,
) -> anyhow::Result<FinalReport>
where
    F: ProfileFetcher + ?Sized,
{
    let max_rounds = max_rounds.max(1);
    let mut report = FinalReport::default();

    let initial = run_one_round(pool, fetcher, pacing, run_id, identifiers).await?;
    report.initial_success = initial.success;
    report.initial_fail = initial.fail;
    report.rounds_executed = 1;

    while report.rounds_executed < max_rounds {
        let failed = storyscan_db::list_failed_identifiers(pool, run_id).await?;
        if failed.is_empty() {
            break;
        }

        let round = report.rounds_executed + 1;
        tracing::info!(round, max_rounds, pending = failed.len(), "retrying failed identifiers");
        println!("\n🔁 Retry round {round}/{max_rounds}: {} identifiers", failed.len());

        // The last identifier of the previous round was not followed by a pause.
        pacing.pause().await;
        let batch: Vec<String> = failed.into_iter().collect();
        let counts = run_one_round(pool, fetcher, pacing, run_id, &batch).await?;
        report.retry_success += counts.success;
        report.rounds_executed = round;
    }

    report.still_failed = storyscan_db::list_failed_identifiers(pool, run_id).await?;
    if !report.still_failed.is_empty() {
        tracing::warn!(
            remaining = report.still_failed.len(),
            rounds = report.rounds_executed,
            "identifiers still failing after final round"
        );
    }

    Ok(report)
}

async fn run_one_round<F>(
    pool: &SqlitePool,
    fetcher: &F,
    pacing: Pacing,
    run_id: i64,
    identifiers: &[String],
) -> anyhow::Result<BatchCounts>
where
    F: ProfileFetcher + ?Sized,
{
    let counts = process_batch(pool, fetcher, pacing, run_id, identifiers).await?;
    storyscan_db::record_round(
        pool,
        run_id,
        i64::try_from(counts.success).unwrap_or(i64::MAX),
        i64::try_from(counts.fail).unwrap_or(i64::MAX),
    )
    .await?;
    Ok(counts)
}
