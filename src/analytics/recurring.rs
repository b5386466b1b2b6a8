use std::collections::HashMap;

use chrono::{Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Category, Transaction};

use super::is_spending;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Bucket a median gap in days.
    fn classify(median_days: i64) -> Option<Self> {
        match median_days {
            5..=9 => Some(Frequency::Weekly),
            12..=16 => Some(Frequency::Biweekly),
            26..=35 => Some(Frequency::Monthly),
            85..=100 => Some(Frequency::Quarterly),
            350..=380 => Some(Frequency::Yearly),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "every two weeks",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }

    fn monthly_cost(self, amount: Decimal) -> Decimal {
        let monthly = match self {
            Frequency::Weekly => amount * Decimal::from(52) / Decimal::from(12),
            Frequency::Biweekly => amount * Decimal::from(26) / Decimal::from(12),
            Frequency::Monthly => amount,
            Frequency::Quarterly => amount / Decimal::from(3),
            Frequency::Yearly => amount / Decimal::from(12),
        };
        monthly.round_dp(2)
    }

    /// The next charge date after `date`. Calendar-based frequencies keep
    /// the day of month (clamped to the month's last day).
    pub fn next_after(self, date: NaiveDate) -> NaiveDate {
        let months = match self {
            Frequency::Weekly => return date + Duration::days(7),
            Frequency::Biweekly => return date + Duration::days(14),
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Yearly => 12,
        };
        date.checked_add_months(Months::new(months))
            .unwrap_or(date + Duration::days(30 * i64::from(months)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringCharge {
    pub merchant: String,
    pub category: Category,
    pub frequency: Frequency,
    /// Median charge amount.
    pub typical_amount: Decimal,
    pub monthly_cost: Decimal,
    pub occurrences: usize,
    pub last_date: NaiveDate,
    pub next_expected: NaiveDate,
    /// The charge was seen within the last two intervals.
    pub active: bool,
    pub is_subscription: bool,
}

fn median_days(sorted: &[i64]) -> i64 {
    let n = sorted.len();
    if n == 0 {
        return 0;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2
    } else {
        sorted[n / 2]
    }
}

fn median_amount(sorted: &[Decimal]) -> Decimal {
    let n = sorted.len();
    if n == 0 {
        return Decimal::ZERO;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / Decimal::TWO
    } else {
        sorted[n / 2]
    }
}

/// Find merchants charged on a regular schedule with a steady amount.
///
/// Expenses are grouped by canonical merchant. A group qualifies when it
/// has at least `min_occurrences` charges, its median gap falls in one of the
/// frequency buckets, and every amount is within `tolerance` (relative) of
/// the median amount. Results are ordered by monthly cost, highest first.
pub fn detect_recurring(
    transactions: &[Transaction],
    min_occurrences: usize,
    tolerance: Decimal,
    today: NaiveDate,
) -> Vec<RecurringCharge> {
    let mut groups: HashMap<String, Vec<&Transaction>> = HashMap::new();
    for tx in transactions.iter().filter(|t| is_spending(t)) {
        groups.entry(tx.merchant.to_lowercase()).or_default().push(tx);
    }

    let min_occurrences = min_occurrences.max(2);
    let mut results = Vec::new();

    for (_key, mut entries) in groups {
        if entries.len() < min_occurrences {
            continue;
        }
        entries.sort_by_key(|t| t.date);

        let mut intervals: Vec<i64> = entries
            .windows(2)
            .map(|pair| (pair[1].date - pair[0].date).num_days())
            .collect();
        intervals.sort_unstable();
        let Some(frequency) = Frequency::classify(median_days(&intervals)) else {
            continue;
        };

        let mut amounts: Vec<Decimal> = entries.iter().map(|t| t.amount).collect();
        amounts.sort();
        let typical_amount = median_amount(&amounts);
        let allowed = typical_amount * tolerance;
        if amounts.iter().any(|a| (*a - typical_amount).abs() > allowed) {
            continue;
        }

        let Some(last) = entries.last() else {
            continue;
        };
        let next_expected = frequency.next_after(last.date);
        let active = frequency.next_after(next_expected) >= today;

        results.push(RecurringCharge {
            merchant: last.merchant.clone(),
            category: last.category,
            frequency,
            typical_amount,
            monthly_cost: frequency.monthly_cost(typical_amount),
            occurrences: entries.len(),
            last_date: last.date,
            next_expected,
            active,
            is_subscription: last.category == Category::Subscriptions,
        });
    }

    results.sort_by(|a, b| {
        b.monthly_cost
            .cmp(&a.monthly_cost)
            .then_with(|| a.merchant.cmp(&b.merchant))
    });
    tracing::debug!(count = results.len(), "Detected recurring charges");
    results
}
