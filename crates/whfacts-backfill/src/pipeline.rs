//! Orchestration of one backfill run.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::try_join_all;
use sqlx::PgPool;
use tokio::sync::Semaphore;

use whfacts_core::dates::{self, Month};
use whfacts_core::facts::DayPatch;
use whfacts_db::{upsert_daily_fact, WarehouseRow};
use whfacts_upstream::UpstreamClient;

use crate::chunks::{chunk_size, INTER_CHUNK_PAUSE};
use crate::error::BackfillError;

#[derive(Debug, Clone, Copy)]
pub struct BackfillOptions {
    /// Ceiling on simultaneously in-flight day-fetches within one
    /// warehouse's run. The client's global ceiling applies on top.
    pub day_concurrency: usize,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self { day_concurrency: 2 }
    }
}

/// Totals for a completed run.
#[derive(Debug, Default, Clone, Copy)]
pub struct BackfillSummary {
    /// Day rows upserted across all warehouses and periods.
    pub days_upserted: usize,
    /// Warehouse-range transactions committed.
    pub commits: usize,
}

/// The ingestion pipeline: upstream client, destination pool, and bounds.
pub struct Backfill {
    client: Arc<UpstreamClient>,
    pool: PgPool,
    options: BackfillOptions,
}

impl Backfill {
    #[must_use]
    pub fn new(client: Arc<UpstreamClient>, pool: PgPool, options: BackfillOptions) -> Self {
        Self {
            client,
            pool,
            options,
        }
    }

    /// Backfills `[start, end]` for each warehouse in turn.
    ///
    /// Warehouses are processed sequentially; each one's days are fetched
    /// concurrently and committed in a single transaction, so a failure
    /// mid-run leaves previously committed warehouses intact and the
    /// failing warehouse absent — safe to re-invoke for the same range.
    ///
    /// # Errors
    ///
    /// Returns [`BackfillError::Upstream`] when any day exhausts its
    /// retries or hits a non-retryable status, and [`BackfillError::Db`]
    /// on persistence failure.
    pub async fn run(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        warehouses: &[WarehouseRow],
    ) -> Result<BackfillSummary, BackfillError> {
        let mut summary = BackfillSummary::default();
        for warehouse in warehouses {
            let patches = collect_warehouse_range(
                &self.client,
                warehouse,
                start,
                end,
                self.options.day_concurrency,
            )
            .await?;

            let mut tx = self.pool.begin().await?;
            for patch in &patches {
                upsert_daily_fact(&mut *tx, patch).await?;
            }
            tx.commit().await?;

            tracing::info!(
                warehouse = %warehouse.name,
                %start,
                %end,
                days = patches.len(),
                "warehouse range committed"
            );
            summary.days_upserted += patches.len();
            summary.commits += 1;
        }
        Ok(summary)
    }

    /// Multi-period driver: one [`run`](Self::run) per calendar month from
    /// `from` through `to`, inclusive.
    ///
    /// # Errors
    ///
    /// Propagates the first failing month's error; months already completed
    /// stay committed.
    pub async fn run_months(
        &self,
        from: Month,
        to: Month,
        warehouses: &[WarehouseRow],
    ) -> Result<BackfillSummary, BackfillError> {
        let mut summary = BackfillSummary::default();
        for month in dates::months_between(from, to) {
            let (start, end) = month.bounds().ok_or(BackfillError::InvalidMonth {
                year: month.year,
                month: month.month,
            })?;
            let part = self.run(start, end, warehouses).await?;
            summary.days_upserted += part.days_upserted;
            summary.commits += part.commits;
            tracing::info!(%month, days = part.days_upserted, "month finished");
        }
        Ok(summary)
    }
}

/// Fetches and merges every metric group for `[start, end]` at one
/// warehouse, without touching the database.
///
/// The sales series is fetched once for the whole range. The per-day
/// profit and goods-receipt reports are then fetched in date chunks:
/// within a chunk all days run concurrently under the per-warehouse
/// ceiling, chunk results are appended in date order, and a fixed pause
/// separates consecutive chunks. Days missing from the sales series get
/// zero sales metrics.
///
/// # Errors
///
/// A day whose retries are exhausted (or that hits a non-retryable
/// status) fails the whole collection — no skip-and-continue. Nothing has
/// been persisted at that point, so the caller simply re-runs the range.
pub async fn collect_warehouse_range(
    client: &UpstreamClient,
    warehouse: &WarehouseRow,
    start: NaiveDate,
    end: NaiveDate,
    day_concurrency: usize,
) -> Result<Vec<DayPatch>, BackfillError> {
    let sales = client
        .sales_series(&warehouse.upstream_id, start, end)
        .await?;
    let days = dates::date_span(start, end);
    let local = Semaphore::new(day_concurrency.max(1));

    let mut patches: Vec<DayPatch> = Vec::with_capacity(days.len());
    for (index, chunk) in days.chunks(chunk_size(day_concurrency)).enumerate() {
        if index > 0 {
            tokio::time::sleep(INTER_CHUNK_PAUSE).await;
        }

        let fetches = chunk.iter().map(|&date| {
            let sales_day = sales.get(&date).copied().unwrap_or_default();
            let local = &local;
            async move {
                let _permit = local.acquire().await.expect("day gate never closed");
                let profit = client.profit_by_day(&warehouse.upstream_id, date).await?;
                let inflow = client.inflow_by_day(&warehouse.upstream_id, date).await?;
                Ok::<DayPatch, BackfillError>(DayPatch {
                    sales: Some(sales_day),
                    profit: Some(profit.profit),
                    discount: Some(profit.discount),
                    inflow: Some(inflow),
                    ..DayPatch::new(date, warehouse.id)
                })
            }
        });

        // try_join_all preserves input order, so days land in date order
        // regardless of completion order within the chunk.
        let mut chunk_patches = try_join_all(fetches).await?;
        patches.append(&mut chunk_patches);
    }
    Ok(patches)
}
