//! The idempotent partial upsert into `daily_facts`.
//!
//! A [`DayPatch`] carries optional per-metric-group contributions; the
//! single statement below inserts zero defaults for groups the patch does
//! not carry and, on conflict, updates only the columns the patch does
//! carry. `COALESCE` against the bound `NULL`s is what keeps independently
//! fetched metric groups from clobbering each other.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use whfacts_core::facts::DayPatch;

/// One persisted row of `daily_facts`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DailyFactRow {
    pub date: NaiveDate,
    pub warehouse_id: i32,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub discount: Decimal,
    pub returns_cost: Decimal,
    pub inflow_cost: Decimal,
    pub receipts_count: i32,
    pub writeoff_cost_total: Decimal,
    pub writeoff_cost_defect: Decimal,
    pub writeoff_cost_inventory: Decimal,
    pub writeoff_cost_other: Decimal,
}

/// Upserts one day's contributions, touching only the columns whose metric
/// group is present in `patch`.
///
/// Takes any `PgExecutor` so callers can batch a whole warehouse-range
/// inside one transaction.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the statement fails (constraint violation,
/// connectivity loss). Upserts are idempotent, so the recommended recovery
/// is re-running the same range.
pub async fn upsert_daily_fact<'e, E>(executor: E, patch: &DayPatch) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO daily_facts \
             (date, warehouse_id, revenue, receipts_count, cost, returns_cost, \
              discount, inflow_cost, writeoff_cost_total, writeoff_cost_defect, \
              writeoff_cost_inventory, writeoff_cost_other) \
         VALUES \
             ($1, $2, COALESCE($3, 0), COALESCE($4, 0), COALESCE($5, 0), COALESCE($6, 0), \
              COALESCE($7, 0), COALESCE($8, 0), COALESCE($9, 0), COALESCE($10, 0), \
              COALESCE($11, 0), COALESCE($12, 0)) \
         ON CONFLICT (date, warehouse_id) DO UPDATE SET \
             revenue                 = COALESCE($3, daily_facts.revenue), \
             receipts_count          = COALESCE($4, daily_facts.receipts_count), \
             cost                    = COALESCE($5, daily_facts.cost), \
             returns_cost            = COALESCE($6, daily_facts.returns_cost), \
             discount                = COALESCE($7, daily_facts.discount), \
             inflow_cost             = COALESCE($8, daily_facts.inflow_cost), \
             writeoff_cost_total     = COALESCE($9, daily_facts.writeoff_cost_total), \
             writeoff_cost_defect    = COALESCE($10, daily_facts.writeoff_cost_defect), \
             writeoff_cost_inventory = COALESCE($11, daily_facts.writeoff_cost_inventory), \
             writeoff_cost_other     = COALESCE($12, daily_facts.writeoff_cost_other)",
    )
    .bind(patch.date)
    .bind(patch.warehouse_id)
    .bind(patch.sales.map(|s| s.revenue))
    .bind(patch.sales.map(|s| s.receipts_count))
    .bind(patch.profit.map(|p| p.cost))
    .bind(patch.profit.map(|p| p.returns_cost))
    .bind(patch.discount.map(|d| d.discount))
    .bind(patch.inflow.map(|i| i.inflow_cost))
    .bind(patch.writeoff.map(|w| w.total))
    .bind(patch.writeoff.map(|w| w.defect))
    .bind(patch.writeoff.map(|w| w.inventory))
    .bind(patch.writeoff.map(|w| w.other))
    .execute(executor)
    .await?;
    Ok(())
}

/// Fetches the stored row for one `(date, warehouse)` key.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_daily_fact<'e, E>(
    executor: E,
    date: NaiveDate,
    warehouse_id: i32,
) -> Result<Option<DailyFactRow>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, DailyFactRow>(
        "SELECT date, warehouse_id, revenue, cost, discount, returns_cost, \
                inflow_cost, receipts_count, writeoff_cost_total, \
                writeoff_cost_defect, writeoff_cost_inventory, writeoff_cost_other \
         FROM daily_facts WHERE date = $1 AND warehouse_id = $2",
    )
    .bind(date)
    .bind(warehouse_id)
    .fetch_optional(executor)
    .await
}
