use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};

use whfacts_core::dates::Month;

mod backfill;
mod warehouses;

#[derive(Debug, Parser)]
#[command(name = "whfacts")]
#[command(about = "Warehouse daily financial fact ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Backfill an inclusive date range for all (or one) warehouses
    Backfill {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Restrict the run to one warehouse by its upstream identifier
        #[arg(long)]
        warehouse: Option<String>,
        /// Override the per-warehouse day-fetch concurrency
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Backfill whole calendar months, committing month by month
    BackfillMonths {
        /// First month, as YYYY-MM
        #[arg(long)]
        from_month: Month,
        /// Last month, as YYYY-MM
        #[arg(long)]
        to_month: Month,
        #[arg(long)]
        warehouse: Option<String>,
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Refresh a trailing window of days for all warehouses
    Sync {
        #[arg(long, default_value_t = 14)]
        days_back: u64,
    },
    /// Refresh the warehouse registry from the upstream store collection
    SyncWarehouses,
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = whfacts_core::load_app_config_from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    match cli.command {
        Commands::Backfill {
            from,
            to,
            warehouse,
            concurrency,
        } => backfill::range(&config, from, to, warehouse.as_deref(), concurrency).await,
        Commands::BackfillMonths {
            from_month,
            to_month,
            warehouse,
            concurrency,
        } => {
            backfill::months(
                &config,
                from_month,
                to_month,
                warehouse.as_deref(),
                concurrency,
            )
            .await
        }
        Commands::Sync { days_back } => {
            let today = Local::now().date_naive();
            let start = today
                .checked_sub_days(Days::new(days_back.saturating_sub(1)))
                .unwrap_or(today);
            backfill::range(&config, start, today, None, None).await
        }
        Commands::SyncWarehouses => warehouses::sync(&config).await,
        Commands::Migrate => backfill::migrate(&config).await,
    }
}
