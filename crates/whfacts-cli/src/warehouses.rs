//! The `sync-warehouses` command handler: pull the upstream store
//! collection and upsert the registry, refreshing names only.

use whfacts_core::AppConfig;
use whfacts_db::PoolConfig;
use whfacts_upstream::{UpstreamClient, UpstreamConfig};

pub async fn sync(config: &AppConfig) -> anyhow::Result<()> {
    let pool =
        whfacts_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await?;
    let client = UpstreamClient::new(UpstreamConfig::from_app(config))?;

    let mut synced = 0usize;
    for store in client.stores().await? {
        let Some(upstream_id) = store.id else {
            tracing::warn!("skipping upstream store without an id");
            continue;
        };
        let name = store
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Unnamed");
        whfacts_db::upsert_warehouse(&pool, &upstream_id, name).await?;
        synced += 1;
    }

    tracing::info!(synced, "warehouse registry synced");
    Ok(())
}
