use chrono::{Duration, NaiveDate};

use crate::analytics::{detect_recurring, kpis_with_top, AnalyticsConfig, Kpis, RecurringCharge};
use crate::format::MoneyFormat;
use crate::models::{Challenge, CustomerProfile, SavingsGoal, Transaction};

/// Everything the nudge generators (tips, reminders, reflection, chat) read
/// about one customer at one moment.
#[derive(Debug, Clone, Copy)]
pub struct CustomerContext<'a> {
    pub profile: &'a CustomerProfile,
    pub transactions: &'a [Transaction],
    pub goals: &'a [SavingsGoal],
    pub challenges: &'a [Challenge],
    pub today: NaiveDate,
    pub analytics: &'a AnalyticsConfig,
    pub money: &'a MoneyFormat,
}

impl<'a> CustomerContext<'a> {
    pub fn recurring(&self) -> Vec<RecurringCharge> {
        detect_recurring(
            self.transactions,
            self.analytics.recurring_min_occurrences,
            self.analytics.recurring_amount_tolerance,
            self.today,
        )
    }

    /// KPIs for the `days` days ending today.
    pub fn trailing_kpis(&self, days: i64) -> Kpis {
        let start = self.today - Duration::days(days.max(1) - 1);
        kpis_with_top(self.transactions, start, self.today, self.analytics.top_n)
    }

    pub fn kpis_between(&self, start: NaiveDate, end: NaiveDate) -> Kpis {
        kpis_with_top(self.transactions, start, end, self.analytics.top_n)
    }
}
