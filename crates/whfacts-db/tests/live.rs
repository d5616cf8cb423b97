//! Live integration tests for whfacts-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/whfacts-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use whfacts_core::facts::{
    DayPatch, DiscountMetrics, InflowMetrics, ProfitMetrics, SalesMetrics, WriteoffMetrics,
};
use whfacts_db::{get_daily_fact, list_warehouses, upsert_daily_fact, upsert_warehouse};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid test date")
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("literal decimal")
}

async fn insert_test_warehouse(pool: &sqlx::PgPool, upstream_id: &str) -> i32 {
    upsert_warehouse(pool, upstream_id, &format!("Warehouse {upstream_id}"))
        .await
        .unwrap_or_else(|e| panic!("insert_test_warehouse failed for '{upstream_id}': {e}"))
        .id
}

fn sales_patch(warehouse_id: i32) -> DayPatch {
    DayPatch {
        sales: Some(SalesMetrics {
            revenue: dec("123.45"),
            receipts_count: 17,
        }),
        ..DayPatch::new(day(), warehouse_id)
    }
}

fn profit_patch(warehouse_id: i32) -> DayPatch {
    DayPatch {
        profit: Some(ProfitMetrics {
            cost: dec("70.10"),
            returns_cost: dec("3.00"),
        }),
        discount: Some(DiscountMetrics {
            discount: dec("5.55"),
        }),
        ..DayPatch::new(day(), warehouse_id)
    }
}

// ---------------------------------------------------------------------------
// Warehouse registry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn warehouse_upsert_refreshes_name_but_keeps_id(pool: sqlx::PgPool) {
    let first = upsert_warehouse(&pool, "wh-1", "Old Name")
        .await
        .expect("insert failed");
    let second = upsert_warehouse(&pool, "wh-1", "New Name")
        .await
        .expect("re-upsert failed");

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "New Name");

    let all = list_warehouses(&pool).await.expect("list failed");
    assert_eq!(all.len(), 1);
}

// ---------------------------------------------------------------------------
// Daily fact upsert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn first_write_defaults_absent_groups_to_zero(pool: sqlx::PgPool) {
    let wh = insert_test_warehouse(&pool, "wh-1").await;

    upsert_daily_fact(&pool, &sales_patch(wh))
        .await
        .expect("upsert failed");

    let row = get_daily_fact(&pool, day(), wh)
        .await
        .expect("fetch failed")
        .expect("row should exist");

    assert_eq!(row.revenue, dec("123.45"));
    assert_eq!(row.receipts_count, 17);
    assert_eq!(row.cost, Decimal::ZERO);
    assert_eq!(row.discount, Decimal::ZERO);
    assert_eq!(row.returns_cost, Decimal::ZERO);
    assert_eq!(row.inflow_cost, Decimal::ZERO);
    assert_eq!(row.writeoff_cost_total, Decimal::ZERO);
}

#[sqlx::test(migrations = "../../migrations")]
async fn partial_update_leaves_other_groups_untouched(pool: sqlx::PgPool) {
    let wh = insert_test_warehouse(&pool, "wh-1").await;

    upsert_daily_fact(&pool, &sales_patch(wh))
        .await
        .expect("sales upsert failed");
    upsert_daily_fact(&pool, &profit_patch(wh))
        .await
        .expect("profit upsert failed");

    let row = get_daily_fact(&pool, day(), wh)
        .await
        .expect("fetch failed")
        .expect("row should exist");

    // Profit-group columns updated…
    assert_eq!(row.cost, dec("70.10"));
    assert_eq!(row.returns_cost, dec("3.00"));
    assert_eq!(row.discount, dec("5.55"));
    // …sales-group columns untouched.
    assert_eq!(row.revenue, dec("123.45"));
    assert_eq!(row.receipts_count, 17);
}

#[sqlx::test(migrations = "../../migrations")]
async fn cross_group_write_order_is_commutative(pool: sqlx::PgPool) {
    let wh_a = insert_test_warehouse(&pool, "wh-a").await;
    let wh_b = insert_test_warehouse(&pool, "wh-b").await;

    // Same contributions, opposite order.
    upsert_daily_fact(&pool, &sales_patch(wh_a)).await.unwrap();
    upsert_daily_fact(&pool, &profit_patch(wh_a)).await.unwrap();

    upsert_daily_fact(&pool, &profit_patch(wh_b)).await.unwrap();
    upsert_daily_fact(&pool, &sales_patch(wh_b)).await.unwrap();

    let row_a = get_daily_fact(&pool, day(), wh_a).await.unwrap().unwrap();
    let row_b = get_daily_fact(&pool, day(), wh_b).await.unwrap().unwrap();

    assert_eq!(row_a.revenue, row_b.revenue);
    assert_eq!(row_a.receipts_count, row_b.receipts_count);
    assert_eq!(row_a.cost, row_b.cost);
    assert_eq!(row_a.returns_cost, row_b.returns_cost);
    assert_eq!(row_a.discount, row_b.discount);
    assert_eq!(row_a.inflow_cost, row_b.inflow_cost);
}

#[sqlx::test(migrations = "../../migrations")]
async fn reapplying_the_same_patches_is_idempotent(pool: sqlx::PgPool) {
    let wh = insert_test_warehouse(&pool, "wh-1").await;
    let full = sales_patch(wh)
        .merge(profit_patch(wh))
        .merge(DayPatch {
            inflow: Some(InflowMetrics {
                inflow_cost: dec("41.00"),
            }),
            ..DayPatch::new(day(), wh)
        });

    upsert_daily_fact(&pool, &full).await.expect("first run");
    let first = get_daily_fact(&pool, day(), wh).await.unwrap().unwrap();

    upsert_daily_fact(&pool, &full).await.expect("second run");
    let second = get_daily_fact(&pool, day(), wh).await.unwrap().unwrap();

    assert_eq!(first, second);
}

#[sqlx::test(migrations = "../../migrations")]
async fn writeoff_buckets_survive_metric_writes(pool: sqlx::PgPool) {
    let wh = insert_test_warehouse(&pool, "wh-1").await;

    let writeoffs = DayPatch {
        writeoff: Some(WriteoffMetrics {
            total: dec("30.00"),
            defect: dec("10.00"),
            inventory: dec("15.00"),
            other: dec("5.00"),
        }),
        ..DayPatch::new(day(), wh)
    };
    upsert_daily_fact(&pool, &writeoffs).await.unwrap();

    // A later pipeline run carries no writeoff group.
    upsert_daily_fact(&pool, &sales_patch(wh)).await.unwrap();

    let row = get_daily_fact(&pool, day(), wh).await.unwrap().unwrap();
    assert_eq!(row.writeoff_cost_total, dec("30.00"));
    assert_eq!(row.writeoff_cost_defect, dec("10.00"));
    assert_eq!(row.writeoff_cost_inventory, dec("15.00"));
    assert_eq!(row.writeoff_cost_other, dec("5.00"));
    assert_eq!(row.revenue, dec("123.45"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn one_row_per_date_and_warehouse(pool: sqlx::PgPool) {
    let wh = insert_test_warehouse(&pool, "wh-1").await;

    upsert_daily_fact(&pool, &sales_patch(wh)).await.unwrap();
    upsert_daily_fact(&pool, &profit_patch(wh)).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_facts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn batch_commits_inside_one_transaction(pool: sqlx::PgPool) {
    let wh = insert_test_warehouse(&pool, "wh-1").await;

    let mut tx = pool.begin().await.expect("begin failed");
    for offset in 0..3i64 {
        let date = day() + chrono::Days::new(u64::try_from(offset).unwrap());
        let patch = DayPatch {
            sales: Some(SalesMetrics {
                revenue: dec("10.00"),
                receipts_count: 1,
            }),
            ..DayPatch::new(date, wh)
        };
        upsert_daily_fact(&mut *tx, &patch).await.expect("upsert in tx");
    }
    tx.commit().await.expect("commit failed");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_facts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 3);
}
