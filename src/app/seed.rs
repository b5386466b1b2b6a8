use anyhow::Result;

use crate::clock::{Clock, SystemClock};
use crate::config::ResolvedConfig;
use crate::models::{IdGenerator, SequentialIdGenerator};
use crate::seed::seed_demo;
use crate::storage::Storage;

use super::{today, CustomerOutput};

pub async fn seed_demo_data(
    storage: &dyn Storage,
    config: &ResolvedConfig,
) -> Result<serde_json::Value> {
    seed_demo_data_with(storage, config, &SequentialIdGenerator::new("demo"), &SystemClock).await
}

/// Write the demo customers, replacing any earlier demo data.
pub async fn seed_demo_data_with(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let today = today(config, clock);
    let customers = seed_demo(storage, clock, ids, &config.challenges, today).await?;
    tracing::info!(customers = customers.len(), "Seeded demo data");
    Ok(serde_json::json!({
        "success": true,
        "today": today,
        "customers": customers.iter().map(CustomerOutput::from).collect::<Vec<_>>(),
    }))
}
