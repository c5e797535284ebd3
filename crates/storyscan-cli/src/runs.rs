use sqlx::SqlitePool;
use storyscan_db::ScrapeRunRow;

/// One summary line for a run, as printed by `db runs`.
pub(crate) fn format_run(run: &ScrapeRunRow) -> String {
    let finished = run
        .completed_at
        .map_or_else(|| "-".to_owned(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
    let mut line = format!(
        "#{} {} [{}] identifiers={} rounds={} success={} fail={} finished={finished}",
        run.id,
        run.status,
        run.trigger_source,
        run.identifiers_total,
        run.rounds_executed,
        run.success_count,
        run.fail_count,
    );
    if let Some(message) = &run.error_message {
        line.push_str(" error=");
        line.push_str(message);
    }
    line
}

/// Prints the newest `limit` runs and returns how many were printed.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub(crate) async fn list_recent_runs(pool: &SqlitePool, limit: i64) -> anyhow::Result<usize> {
    let runs = storyscan_db::list_scrape_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no scrape runs recorded");
    }
    for run in &runs {
        println!("{}", format_run(run));
    }
    Ok(runs.len())
}
