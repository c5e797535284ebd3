use std::path::Path;

use anyhow::Context as _;
use sqlx::SqlitePool;

/// Writes the full success and failure logs to `output`.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the workbook cannot be saved.
pub(crate) async fn run_export(
    pool: &SqlitePool,
    config: &storyscan_core::AppConfig,
    output: &Path,
) -> anyhow::Result<()> {
    let users = storyscan_db::list_users(pool).await?;
    let failures = storyscan_db::list_failures(pool).await?;
    storyscan_report::export_report(output, &users, &failures, config.report_utc_offset)
        .with_context(|| format!("writing report to {}", output.display()))?;
    Ok(())
}
