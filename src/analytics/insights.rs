use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::format::{format_percent, MoneyFormat};
use crate::models::Transaction;

use super::kpis::percent_of;
use super::{kpis, month_start, previous_month_start, RecurringCharge};

/// Percent above last month's total that counts as a spike.
const SPIKE_PERCENT: i64 = 25;
/// Smallest increase in money worth calling out.
const SPIKE_MIN_DELTA: i64 = 20;
const STRONG_SAVINGS_RATE: i64 = 20;
const LOW_SAVINGS_RATE: i64 = 10;
const NO_SPEND_CELEBRATE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    TopCategory,
    CategorySpike,
    SubscriptionsTotal,
    SavingsRate,
    NoSpendDays,
    LargestPurchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Month-to-date observations, in a fixed kind order. Kinds without data are skipped.
pub fn insights(
    transactions: &[Transaction],
    recurring: &[RecurringCharge],
    today: NaiveDate,
    money: &MoneyFormat,
) -> Vec<Insight> {
    let current = kpis(transactions, month_start(today), today);
    let previous = kpis(
        transactions,
        previous_month_start(today),
        month_start(today) - Duration::days(1),
    );
    let mut out = Vec::new();

    if let Some(top) = current.categories.first() {
        out.push(Insight {
            kind: InsightKind::TopCategory,
            severity: Severity::Info,
            title: format!("Top category: {}", top.category.label()),
            message: format!(
                "{} was your biggest category this month at {} ({} of spending).",
                top.category.label(),
                money.format(top.amount),
                format_percent(top.share)
            ),
        });
    }

    let spike = current
        .categories
        .iter()
        .filter_map(|c| {
            let before = previous
                .categories
                .iter()
                .find(|p| p.category == c.category)?
                .amount;
            let delta = c.amount - before;
            let threshold = before * Decimal::from(100 + SPIKE_PERCENT) / Decimal::ONE_HUNDRED;
            (c.amount > threshold && delta >= Decimal::from(SPIKE_MIN_DELTA))
                .then_some((c, before, delta))
        })
        .max_by(|a, b| a.2.cmp(&b.2));
    if let Some((share, before, delta)) = spike {
        out.push(Insight {
            kind: InsightKind::CategorySpike,
            severity: Severity::Warning,
            title: format!("{} is up", share.category.label()),
            message: format!(
                "You've spent {} on {} so far this month, {} more than all of last month ({}).",
                money.format(share.amount),
                share.category.label(),
                format_percent(percent_of(delta, before)),
                money.format(before)
            ),
        });
    }

    let subscriptions: Vec<&RecurringCharge> = recurring
        .iter()
        .filter(|r| r.active && r.is_subscription)
        .collect();
    if !subscriptions.is_empty() {
        let monthly: Decimal = subscriptions.iter().map(|r| r.monthly_cost).sum();
        let noun = if subscriptions.len() == 1 {
            "subscription costs"
        } else {
            "subscriptions cost"
        };
        out.push(Insight {
            kind: InsightKind::SubscriptionsTotal,
            severity: Severity::Info,
            title: "Subscriptions".to_string(),
            message: format!(
                "{} active {noun} about {} a month ({} a year).",
                subscriptions.len(),
                money.format(monthly),
                money.format_whole(monthly * Decimal::from(12))
            ),
        });
    }

    if let Some(rate) = current.savings_rate {
        let (severity, message) = if rate >= Decimal::from(STRONG_SAVINGS_RATE) {
            (
                Severity::Positive,
                format!("You're keeping {} of this month's income. Nice work.", format_percent(rate)),
            )
        } else if rate < Decimal::from(LOW_SAVINGS_RATE) {
            (
                Severity::Warning,
                format!(
                    "Only {} of this month's income is left after spending. Aim for at least {}%.",
                    format_percent(rate),
                    LOW_SAVINGS_RATE
                ),
            )
        } else {
            (
                Severity::Info,
                format!("You're saving {} of this month's income.", format_percent(rate)),
            )
        };
        out.push(Insight {
            kind: InsightKind::SavingsRate,
            severity,
            title: "Savings rate".to_string(),
            message,
        });
    }

    if current.no_spend_days >= NO_SPEND_CELEBRATE {
        out.push(Insight {
            kind: InsightKind::NoSpendDays,
            severity: Severity::Positive,
            title: "No-spend days".to_string(),
            message: format!(
                "You've had {} no-spend days this month.",
                current.no_spend_days
            ),
        });
    }

    if let Some(largest) = &current.largest_expense {
        out.push(Insight {
            kind: InsightKind::LargestPurchase,
            severity: Severity::Info,
            title: "Largest purchase".to_string(),
            message: format!(
                "Your biggest purchase this month was {} at {} on {}.",
                money.format(largest.amount),
                largest.merchant,
                largest.date.format("%b %-d")
            ),
        });
    }

    out
}
