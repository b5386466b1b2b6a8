//! Spending analytics over a customer's transactions: period KPIs,
//! month-over-month movement, recurring charge detection and text insights.

mod insights;
mod kpis;
mod recurring;

pub use insights::{insights, Insight, InsightKind, Severity};
pub use kpis::{
    kpis, kpis_with_top, month_over_month, CategoryChange, CategoryShare, Kpis, LargestExpense,
    MerchantTotal,
};
pub(crate) use kpis::percent_of;
pub use recurring::{detect_recurring, Frequency, RecurringCharge};

use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Category, Transaction};

/// Tuning for recurring detection, reminders and ranked lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub recurring_min_occurrences: usize,
    /// Allowed relative deviation from the median amount (0.2 = 20%).
    pub recurring_amount_tolerance: Decimal,
    pub reminder_window_days: u32,
    pub top_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            recurring_min_occurrences: 3,
            recurring_amount_tolerance: Decimal::new(2, 1),
            reminder_window_days: 7,
            top_n: 5,
        }
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(date)
}

pub fn previous_month_start(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_sub_months(Months::new(1))
        .unwrap_or_else(|| month_start(date))
}

/// Expenses that count toward spending totals. Transfers move money between
/// the customer's own accounts or people and are left out.
pub(crate) fn is_spending(tx: &Transaction) -> bool {
    tx.is_expense() && tx.category != Category::Transfers
}
