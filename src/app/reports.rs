use anyhow::Result;
use chrono::NaiveDate;

use crate::analytics::{self, month_start, CategoryChange, Insight, Kpis, RecurringCharge};
use crate::benchmarks::{self, BenchmarkReport};
use crate::clock::Clock;
use crate::config::ResolvedConfig;
use crate::reflection::{self, Reflection};
use crate::storage::Storage;
use crate::tips::{self, Reminder, Tip};

use super::{today, CustomerData};

/// KPIs for `[from, to]`. The range defaults to the current month so far.
pub async fn kpis_report(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    clock: &dyn Clock,
) -> Result<Kpis> {
    let data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    let end = to.unwrap_or(today);
    let start = from.unwrap_or_else(|| month_start(end));
    if end < start {
        anyhow::bail!("Report range ends before it starts ({start} to {end})");
    }
    Ok(data.context(config, today).kpis_between(start, end))
}

pub async fn month_over_month_report(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    month: Option<NaiveDate>,
    clock: &dyn Clock,
) -> Result<Vec<CategoryChange>> {
    let data = CustomerData::load(storage, customer).await?;
    let month = month.unwrap_or_else(|| today(config, clock));
    Ok(analytics::month_over_month(&data.transactions, month))
}

pub async fn recurring_report(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    clock: &dyn Clock,
) -> Result<Vec<RecurringCharge>> {
    let data = CustomerData::load(storage, customer).await?;
    Ok(data.context(config, today(config, clock)).recurring())
}

pub async fn insights_report(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    clock: &dyn Clock,
) -> Result<Vec<Insight>> {
    let data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    let ctx = data.context(config, today);
    Ok(analytics::insights(
        &data.transactions,
        &ctx.recurring(),
        today,
        &config.display,
    ))
}

pub async fn benchmark_report(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    month: Option<NaiveDate>,
    clock: &dyn Clock,
) -> Result<BenchmarkReport> {
    let data = CustomerData::load(storage, customer).await?;
    let month = month.unwrap_or_else(|| today(config, clock));
    Ok(benchmarks::compare(
        &data.profile,
        &data.transactions,
        month,
        &config.display,
    ))
}

pub async fn tips_report(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    clock: &dyn Clock,
) -> Result<Vec<Tip>> {
    let mut data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    data.catch_up_challenges(storage, config, today).await?;
    Ok(tips::tips(&data.context(config, today)))
}

pub async fn reminders_report(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    clock: &dyn Clock,
) -> Result<Vec<Reminder>> {
    let mut data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    data.catch_up_challenges(storage, config, today).await?;
    Ok(tips::reminders(&data.context(config, today)))
}

/// Reflection for the month containing `month`, defaulting to last month.
pub async fn reflection_report(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    month: Option<NaiveDate>,
    clock: &dyn Clock,
) -> Result<Reflection> {
    let mut data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    data.catch_up_challenges(storage, config, today).await?;
    let month = month.unwrap_or_else(|| analytics::previous_month_start(today));
    Ok(reflection::reflection(&data.context(config, today), month))
}
