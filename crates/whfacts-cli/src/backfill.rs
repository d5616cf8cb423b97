//! The `backfill`, `backfill-months`, `sync`, and `migrate` command
//! handlers: wire config into pool + client, resolve the warehouse set,
//! and hand off to the pipeline.

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;

use whfacts_backfill::{Backfill, BackfillOptions};
use whfacts_core::dates::Month;
use whfacts_core::AppConfig;
use whfacts_db::{PoolConfig, WarehouseRow};
use whfacts_upstream::{UpstreamClient, UpstreamConfig};

pub async fn range(
    config: &AppConfig,
    from: NaiveDate,
    to: NaiveDate,
    warehouse: Option<&str>,
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    if from > to {
        anyhow::bail!("--from {from} is after --to {to}");
    }
    let (pool, client, warehouses) = setup(config, warehouse).await?;
    let backfill = Backfill::new(client, pool, options(config, concurrency));

    let summary = backfill.run(from, to, &warehouses).await?;
    tracing::info!(
        days = summary.days_upserted,
        commits = summary.commits,
        "backfill finished"
    );
    Ok(())
}

pub async fn months(
    config: &AppConfig,
    from_month: Month,
    to_month: Month,
    warehouse: Option<&str>,
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    if from_month > to_month {
        anyhow::bail!("--from-month {from_month} is after --to-month {to_month}");
    }
    let (pool, client, warehouses) = setup(config, warehouse).await?;
    let backfill = Backfill::new(client, pool, options(config, concurrency));

    let summary = backfill.run_months(from_month, to_month, &warehouses).await?;
    tracing::info!(
        days = summary.days_upserted,
        commits = summary.commits,
        "month backfill finished"
    );
    Ok(())
}

pub async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let applied = whfacts_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations applied");
    Ok(())
}

fn options(config: &AppConfig, concurrency: Option<usize>) -> BackfillOptions {
    BackfillOptions {
        day_concurrency: concurrency.unwrap_or(config.day_concurrency),
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool =
        whfacts_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await?;
    Ok(pool)
}

async fn setup(
    config: &AppConfig,
    warehouse_filter: Option<&str>,
) -> anyhow::Result<(PgPool, Arc<UpstreamClient>, Vec<WarehouseRow>)> {
    let pool = connect(config).await?;
    let client = Arc::new(UpstreamClient::new(UpstreamConfig::from_app(config))?);

    let warehouses = if let Some(upstream_id) = warehouse_filter {
        let warehouse = whfacts_db::get_warehouse_by_upstream_id(&pool, upstream_id)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!("warehouse '{upstream_id}' not found; run sync-warehouses first")
            })?;
        vec![warehouse]
    } else {
        let all = whfacts_db::list_warehouses(&pool).await?;
        if all.is_empty() {
            anyhow::bail!("no warehouses in the database; run sync-warehouses first");
        }
        all
    };

    Ok((pool, client, warehouses))
}
