//! One sequential pass over a list of identifiers.

use chrono::Utc;
use sqlx::SqlitePool;
use storyscan_core::{Outcome, UserRecord};
use storyscan_scraper::{classify, Pacing, ProfileFetcher};

/// Success and failure counts for one [`process_batch`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BatchCounts {
    pub success: usize,
    pub fail: usize,
}

/// Fetches, classifies, and persists each identifier in input order.
///
/// Every identifier ends the pass with either its fan-out rows in `users` or
/// exactly one new row in `users_invalid`. Fetch and classification failures
/// are recorded and skipped; store errors abort the batch.
///
/// `pacing` is applied between consecutive identifiers.
pub(crate) async fn process_batch<F>(
    pool: &SqlitePool,
    fetcher: &F,
    pacing: Pacing,
    run_id: i64,
    identifiers: &[String],
) -> anyhow::Result<BatchCounts>
where
    F: ProfileFetcher + ?Sized,
{
    let mut counts = BatchCounts::default();
    let total = identifiers.len();

    for (index, identifier) in identifiers.iter().enumerate() {
        let raw = fetcher.fetch_raw(identifier).await;

        match classify(identifier, &raw) {
            Outcome::Valid { profile, mentions } => {
                let records = UserRecord::fan_out(identifier, &profile, &mentions, Utc::now());
                let rows = storyscan_db::append_user_records(pool, run_id, &records).await?;
                counts.success += 1;
                tracing::debug!(identifier, rows, "profile saved");
                println!("✅ {identifier} saved ({rows} rows)");
            }
            failed => {
                let (category, reason) = failed
                    .failure()
                    .ok_or_else(|| anyhow::anyhow!("non-valid outcome without failure details"))?;
                storyscan_db::append_failure(pool, run_id, identifier, category, reason).await?;
                counts.fail += 1;
                tracing::info!(identifier, %category, reason, "identifier failed");
                println!("❌ {identifier} failed ({category}): {reason}");
            }
        }

        let remaining = total - index - 1;
        println!(
            "⏳ success: {}, failed: {}, remaining: {remaining}",
            counts.success, counts.fail
        );

        if remaining > 0 {
            pacing.pause().await;
        }
    }

    Ok(counts)
}
