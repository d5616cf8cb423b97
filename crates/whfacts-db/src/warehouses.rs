//! Read/write operations for the `warehouses` registry table.

use sqlx::PgPool;

/// One row of the warehouse registry.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WarehouseRow {
    pub id: i32,
    pub upstream_id: String,
    pub name: String,
}

/// All known warehouses, in insertion order.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_warehouses(pool: &PgPool) -> Result<Vec<WarehouseRow>, sqlx::Error> {
    sqlx::query_as::<_, WarehouseRow>(
        "SELECT id, upstream_id, name FROM warehouses ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

/// Looks up one warehouse by its upstream store identifier.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_warehouse_by_upstream_id(
    pool: &PgPool,
    upstream_id: &str,
) -> Result<Option<WarehouseRow>, sqlx::Error> {
    sqlx::query_as::<_, WarehouseRow>(
        "SELECT id, upstream_id, name FROM warehouses WHERE upstream_id = $1",
    )
    .bind(upstream_id)
    .fetch_optional(pool)
    .await
}

/// Insert a warehouse or refresh its display name, keyed on the upstream
/// identifier. The internal `id` is stable across re-syncs.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_warehouse(
    pool: &PgPool,
    upstream_id: &str,
    name: &str,
) -> Result<WarehouseRow, sqlx::Error> {
    sqlx::query_as::<_, WarehouseRow>(
        "INSERT INTO warehouses (upstream_id, name) VALUES ($1, $2) \
         ON CONFLICT (upstream_id) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id, upstream_id, name",
    )
    .bind(upstream_id)
    .bind(name)
    .fetch_one(pool)
    .await
}
