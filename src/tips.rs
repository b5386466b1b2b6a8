//! Rule-based tips and reminders.
//!
//! Both lists are re-derived from the customer's data on every call; nothing
//! here is persisted. Each entry carries a stable `key` so the same nudge is
//! never listed twice.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::analytics::percent_of;
use crate::benchmarks::percentile_for;
use crate::challenges::{self, ChallengeStatus};
use crate::context::CustomerContext;
use crate::format::format_percent;
use crate::goals;
use crate::models::Category;

const LOOKBACK_DAYS: i64 = 30;
/// Dining plus coffee share of spending (percent) that triggers a tip.
const EATING_OUT_SHARE: i64 = 25;
const SUBSCRIPTION_COUNT: usize = 3;
/// Peer percentile at which a category counts as high.
const HIGH_PERCENTILE: u32 = 75;
const LOW_SAVINGS_RATE: i64 = 10;
const STREAK_MILESTONES: &[u32] = &[3, 7, 14, 21, 30, 60, 90];
const GOAL_DEADLINE_DAYS: i64 = 30;
const GOAL_IDLE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tip {
    pub key: String,
    pub priority: Priority,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub key: String,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
}

trait Keyed {
    fn key(&self) -> &str;
    fn priority(&self) -> Priority;
}

impl Keyed for Tip {
    fn key(&self) -> &str {
        &self.key
    }
    fn priority(&self) -> Priority {
        self.priority
    }
}

impl Keyed for Reminder {
    fn key(&self) -> &str {
        &self.key
    }
    fn priority(&self) -> Priority {
        self.priority
    }
}

/// Highest priority first, then by key; the first entry for a key wins.
fn rank<T: Keyed>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| {
        a.priority()
            .cmp(&b.priority())
            .then_with(|| a.key().cmp(b.key()))
    });
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.key().to_string()));
    items
}

pub fn tips(ctx: &CustomerContext<'_>) -> Vec<Tip> {
    let mut out = Vec::new();
    let recent = ctx.trailing_kpis(LOOKBACK_DAYS);
    let money = ctx.money;

    let eating_out: Decimal = recent
        .categories
        .iter()
        .filter(|c| matches!(c.category, Category::Dining | Category::Coffee))
        .map(|c| c.amount)
        .sum();
    let eating_out_share = percent_of(eating_out, recent.expenses);
    if eating_out_share > Decimal::from(EATING_OUT_SHARE) {
        out.push(Tip {
            key: "eating_out".to_string(),
            priority: Priority::Medium,
            title: "Eating out adds up".to_string(),
            message: format!(
                "Dining out and coffee were {} of your spending in the last {} days ({}). \
                 Cutting that by a quarter would free up about {}.",
                format_percent(eating_out_share),
                LOOKBACK_DAYS,
                money.format(eating_out),
                money.format(eating_out / Decimal::from(4))
            ),
        });
    }

    let subscriptions: Vec<_> = ctx
        .recurring()
        .into_iter()
        .filter(|r| r.active && r.is_subscription)
        .collect();
    if subscriptions.len() >= SUBSCRIPTION_COUNT {
        let monthly: Decimal = subscriptions.iter().map(|r| r.monthly_cost).sum();
        out.push(Tip {
            key: "subscriptions".to_string(),
            priority: Priority::Medium,
            title: "Review your subscriptions".to_string(),
            message: format!(
                "You have {} active subscriptions costing {} a month. Cancel one you rarely use.",
                subscriptions.len(),
                money.format(monthly)
            ),
        });
    }

    for goal in ctx.goals {
        let Some(deadline) = goal.deadline else {
            continue;
        };
        let progress = goals::progress(goal, ctx.today);
        if progress.complete || progress.on_track {
            continue;
        }
        let required = progress.required_monthly.unwrap_or(progress.remaining);
        out.push(Tip {
            key: format!("goal_behind:{}", goal.id),
            priority: Priority::High,
            title: format!("{} is behind schedule", goal.name),
            message: format!(
                "Put aside {} a month to reach {} by {}.",
                money.format(required),
                money.format(goal.target),
                deadline.format("%b %-d, %Y")
            ),
        });
    }

    let any_active = ctx
        .challenges
        .iter()
        .any(|c| challenges::progress(c, ctx.today).status == ChallengeStatus::Active);
    if !any_active {
        let band = ctx.profile.age_band();
        let high = recent.categories.iter().find(|c| {
            c.category.is_discretionary()
                && percentile_for(band, Some(c.category), c.amount)
                    .map_or(c.share >= Decimal::from(EATING_OUT_SHARE), |p| p >= HIGH_PERCENTILE)
        });
        if let Some(high) = high {
            out.push(Tip {
                key: format!("start_challenge:{}", high.category),
                priority: Priority::Medium,
                title: "Try a challenge".to_string(),
                message: format!(
                    "You spent {} on {} in the last {} days. A 7-day challenge without it \
                     could save about {}.",
                    money.format(high.amount),
                    high.category.label().to_lowercase(),
                    LOOKBACK_DAYS,
                    money.format(high.amount * Decimal::from(7) / Decimal::from(LOOKBACK_DAYS))
                ),
            });
        }
    }

    for challenge in ctx.challenges {
        let progress = challenges::progress(challenge, ctx.today);
        if progress.status != ChallengeStatus::Active
            || !STREAK_MILESTONES.contains(&progress.current_streak)
        {
            continue;
        }
        out.push(Tip {
            key: format!("streak:{}", challenge.id),
            priority: Priority::Low,
            title: format!("{}-day streak!", progress.current_streak),
            message: format!(
                "{} days in a row on \"{}\". You've put away {} so far.",
                progress.current_streak,
                challenge.name,
                money.format(progress.total_saved)
            ),
        });
    }

    if let Some(rate) = recent.savings_rate {
        if rate < Decimal::from(LOW_SAVINGS_RATE) {
            out.push(Tip {
                key: "savings_rate".to_string(),
                priority: Priority::High,
                title: "Low savings rate".to_string(),
                message: format!(
                    "You kept {} of your income over the last {} days. \
                     Try moving {} to savings on payday.",
                    format_percent(rate),
                    LOOKBACK_DAYS,
                    money.format_whole(
                        recent.income * Decimal::from(LOW_SAVINGS_RATE) / Decimal::ONE_HUNDRED
                    )
                ),
            });
        }
    }

    rank(out)
}

pub fn reminders(ctx: &CustomerContext<'_>) -> Vec<Reminder> {
    let mut out = Vec::new();
    let today = ctx.today;
    let money = ctx.money;
    let window_end = today + Duration::days(i64::from(ctx.analytics.reminder_window_days));

    for charge in ctx.recurring() {
        if !charge.active || charge.next_expected < today || charge.next_expected > window_end {
            continue;
        }
        let soon = charge.next_expected - today <= Duration::days(2);
        out.push(Reminder {
            key: format!("charge:{}", charge.merchant.to_lowercase()),
            priority: if soon { Priority::Medium } else { Priority::Low },
            title: format!("Upcoming: {}", charge.merchant),
            message: format!(
                "{} ({}, {}) is expected around {}.",
                charge.merchant,
                money.format(charge.typical_amount),
                charge.frequency.label(),
                charge.next_expected.format("%b %-d")
            ),
            due: Some(charge.next_expected),
        });
    }

    for goal in ctx.goals.iter().filter(|g| !g.is_complete()) {
        if let Some(deadline) = goal.deadline {
            if deadline >= today && deadline - today <= Duration::days(GOAL_DEADLINE_DAYS) {
                out.push(Reminder {
                    key: format!("goal_deadline:{}", goal.id),
                    priority: Priority::High,
                    title: format!("{} is due soon", goal.name),
                    message: format!(
                        "{} to go before {}.",
                        money.format(goal.target - goal.saved),
                        deadline.format("%b %-d")
                    ),
                    due: Some(deadline),
                });
            }
        }

        let last = goal.last_contribution().unwrap_or(goal.created_on);
        if today - last > Duration::days(GOAL_IDLE_DAYS) {
            out.push(Reminder {
                key: format!("goal_idle:{}", goal.id),
                priority: Priority::Low,
                title: format!("Top up {}", goal.name),
                message: format!(
                    "Nothing has gone into {} since {}. Even a small deposit keeps it moving.",
                    goal.name,
                    last.format("%b %-d")
                ),
                due: None,
            });
        }
    }

    for challenge in ctx.challenges {
        if !challenge.contains(today) || challenge.checkin_on(today).is_some() {
            continue;
        }
        let streak = challenges::current_streak(&challenge.checkins, today);
        let message = if streak > 0 {
            format!("Check in on \"{}\" today to keep your {streak}-day streak.", challenge.name)
        } else {
            format!("Check in on \"{}\" today.", challenge.name)
        };
        out.push(Reminder {
            key: format!("checkin:{}", challenge.id),
            priority: Priority::Medium,
            title: "Daily check-in".to_string(),
            message,
            due: Some(today),
        });
    }

    rank(out)
}
