use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::clock::{Clock, SystemClock};
use crate::config::ResolvedConfig;
use crate::goals;
use crate::models::{IdGenerator, SavingsGoal, UuidIdGenerator};
use crate::storage::Storage;

use super::{require_customer, today, GoalOutput};

pub async fn add_goal(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    name: &str,
    target: Decimal,
    deadline: Option<NaiveDate>,
) -> Result<serde_json::Value> {
    add_goal_with(
        storage,
        config,
        customer,
        name,
        target,
        deadline,
        &UuidIdGenerator,
        &SystemClock,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn add_goal_with(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    name: &str,
    target: Decimal,
    deadline: Option<NaiveDate>,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let profile = require_customer(storage, customer).await?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Goal name cannot be empty");
    }
    let today = today(config, clock);

    let mut all = storage.get_goals(&profile.id).await?;
    if all.iter().any(|g| g.name.eq_ignore_ascii_case(name)) {
        anyhow::bail!("Goal name already exists: {name}");
    }
    let goal = goals::create_goal(ids, name, target, deadline, today)?;
    let output = GoalOutput::new(&goal, today);
    all.push(goal);
    storage
        .save_goals(&profile.id, &all)
        .await
        .context("Failed to save goals")?;
    tracing::info!(customer = %profile.id, goal = %output.id, "Added goal");

    Ok(serde_json::json!({
        "success": true,
        "goal": output,
    }))
}

fn find_goal<'a>(all: &'a mut [SavingsGoal], id_or_name: &str) -> Result<&'a mut SavingsGoal> {
    all.iter_mut()
        .find(|g| g.id.as_str() == id_or_name || g.name.eq_ignore_ascii_case(id_or_name))
        .with_context(|| format!("Goal not found: {id_or_name}"))
}

async fn move_money(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    goal: &str,
    amount: Decimal,
    clock: &dyn Clock,
    deposit: bool,
) -> Result<serde_json::Value> {
    let profile = require_customer(storage, customer).await?;
    let today = today(config, clock);
    let mut all = storage.get_goals(&profile.id).await?;

    let target = find_goal(&mut all, goal)?;
    let was_complete = target.is_complete();
    if deposit {
        goals::contribute(target, amount, today)?;
    } else {
        goals::withdraw(target, amount, today)?;
    }
    let output = GoalOutput::new(target, today);
    let reached = !was_complete && target.is_complete();

    storage.save_goals(&profile.id, &all).await?;
    tracing::info!(
        customer = %profile.id,
        goal = %output.id,
        %amount,
        deposit,
        "Updated goal balance"
    );

    Ok(serde_json::json!({
        "success": true,
        "goal": output,
        "reached": reached,
    }))
}

pub async fn contribute_goal(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    goal: &str,
    amount: Decimal,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    move_money(storage, config, customer, goal, amount, clock, true).await
}

pub async fn withdraw_goal(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    goal: &str,
    amount: Decimal,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    move_money(storage, config, customer, goal, amount, clock, false).await
}

pub async fn list_goals(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    clock: &dyn Clock,
) -> Result<Vec<GoalOutput>> {
    let profile = require_customer(storage, customer).await?;
    let today = today(config, clock);
    let all = storage.get_goals(&profile.id).await?;
    Ok(all.iter().map(|g| GoalOutput::new(g, today)).collect())
}
