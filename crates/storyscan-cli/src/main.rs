mod collect;
mod export;
mod runs;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storyscan")]
#[command(about = "Scrape profile and story metadata into SQLite and export a bilingual report")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments for the default `run` command
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every identifier in the input file, retry failures, and export the report
    Run(RunArgs),
    /// Re-export the report from the current store without scraping
    Export {
        /// Workbook to write (defaults to STORYSCAN_REPORT_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Identifier file: spreadsheet or one identifier per line (defaults to STORYSCAN_INPUT_PATH)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Workbook to write (defaults to STORYSCAN_REPORT_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Maximum scrape rounds including the first pass (defaults to STORYSCAN_MAX_ROUNDS)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_rounds: Option<u32>,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
    /// List recent scrape runs, newest first
    Runs {
        /// Number of runs to show
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(i64).range(1..))]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = storyscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = storyscan_db::PoolConfig::from_app_config(&config);
    let pool = storyscan_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Some(Commands::Db { command }) => match command {
            DbCommands::Migrate => {
                let applied = storyscan_db::run_migrations(&pool).await?;
                println!("migrations applied: {applied}");
            }
            DbCommands::Ping => {
                storyscan_db::ping(&pool).await?;
                println!("database ok");
            }
            DbCommands::Runs { limit } => {
                storyscan_db::run_migrations(&pool).await?;
                runs::list_recent_runs(&pool, limit).await?;
            }
        },
        Some(Commands::Export { output }) => {
            storyscan_db::run_migrations(&pool).await?;
            let output = output.unwrap_or_else(|| config.report_path.clone());
            export::run_export(&pool, &config, &output).await?;
            println!("report written to {}", output.display());
        }
        Some(Commands::Run(args)) => run(&pool, &config, args).await?,
        None => run(&pool, &config, cli.run).await?,
    }

    Ok(())
}

async fn run(
    pool: &sqlx::SqlitePool,
    config: &storyscan_core::AppConfig,
    args: RunArgs,
) -> anyhow::Result<()> {
    storyscan_db::run_migrations(pool).await?;
    let options = collect::RunOptions {
        input: args.input.unwrap_or_else(|| config.input_path.clone()),
        output: args.output.unwrap_or_else(|| config.report_path.clone()),
        max_rounds: args.max_rounds.unwrap_or(config.max_rounds),
    };
    collect::run_scrape(pool, config, &options).await
}

/// Marks the run as failed, logging (not propagating) any error doing so.
async fn fail_run_best_effort(pool: &sqlx::SqlitePool, run_id: i64, message: String) {
    if let Err(mark_err) = storyscan_db::fail_scrape_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark scrape run as failed"
        );
    }
}
