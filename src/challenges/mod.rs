//! Spending challenges: daily check-ins, streaks and savings hacks.
//!
//! A challenge's visible state is always derived from its stored check-in
//! list; the only other persisted counter is `best_streak`, which only grows.

mod checkin;
mod progress;

pub use checkin::{auto_checkin, check_in, reevaluate, violations_on};
pub use progress::{
    calendar, current_streak, longest_streak, progress, ChallengeProgress, ChallengeStatus,
    DayCell, DayState,
};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use crate::models::MAX_DURATION_DAYS;

use crate::models::{Challenge, ChallengeScope, Hack, IdGenerator, Transaction};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("{date} is outside the challenge window ({start} to {end})")]
    OutsideWindow {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("Cannot check in for {date}: it is after today ({today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },
    #[error("Challenge duration must be between 1 and 365 days (got {0})")]
    InvalidDuration(u32),
}

/// Amounts used by the savings hacks and the baseline estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeSettings {
    /// Paid into savings for every missed day when `swear_jar` is on.
    pub swear_jar_penalty: Decimal,
    /// Extra percentage of the daily estimate saved on done days with `smart_save`.
    pub smart_save_percent: Decimal,
    /// Fixed daily transfer with `set_forget`.
    pub set_forget_daily: Decimal,
    /// Days of history used to estimate what a challenge saves per day.
    pub baseline_days: u32,
    /// Floor for the daily estimate so a new challenge always saves something.
    pub min_daily_saving: Decimal,
}

impl Default for ChallengeSettings {
    fn default() -> Self {
        Self {
            swear_jar_penalty: Decimal::from(5),
            smart_save_percent: Decimal::from(10),
            set_forget_daily: Decimal::ONE,
            baseline_days: 30,
            min_daily_saving: Decimal::ONE,
        }
    }
}

/// Parameters for starting a new challenge.
#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub name: String,
    pub scope: ChallengeScope,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub hacks: Vec<Hack>,
}

/// Average daily in-scope spend over the `baseline_days` before `today`,
/// floored at `min_daily_saving`.
pub fn estimate_daily_saving(
    scope: &ChallengeScope,
    transactions: &[Transaction],
    today: NaiveDate,
    settings: &ChallengeSettings,
) -> Decimal {
    let days = settings.baseline_days.max(1);
    let window_start = today - Duration::days(i64::from(days));
    let spent: Decimal = transactions
        .iter()
        .filter(|t| t.date >= window_start && t.date < today)
        .filter(|t| scope.is_violated_by(t))
        .map(|t| t.amount)
        .sum();
    let average = (spent / Decimal::from(days)).round_dp(2);
    average.max(settings.min_daily_saving)
}

/// Build a challenge with its daily saving estimated from recent history.
pub fn create_challenge(
    ids: &dyn IdGenerator,
    params: NewChallenge,
    transactions: &[Transaction],
    today: NaiveDate,
    settings: &ChallengeSettings,
) -> Result<Challenge, ChallengeError> {
    if params.duration_days == 0 || params.duration_days > MAX_DURATION_DAYS {
        return Err(ChallengeError::InvalidDuration(params.duration_days));
    }

    let mut hacks = Vec::with_capacity(params.hacks.len());
    for hack in params.hacks {
        if !hacks.contains(&hack) {
            hacks.push(hack);
        }
    }

    let estimated_daily_saving = estimate_daily_saving(&params.scope, transactions, today, settings);
    tracing::debug!(
        scope = %params.scope.label(),
        estimate = %estimated_daily_saving,
        "Estimated daily saving for new challenge"
    );

    Ok(Challenge {
        id: ids.new_id(),
        name: params.name,
        scope: params.scope,
        start_date: params.start_date,
        duration_days: params.duration_days,
        estimated_daily_saving,
        hacks,
        checkins: Vec::new(),
        best_streak: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, FixedIdGenerator, Id};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn estimate_averages_scope_spend_over_baseline() {
        let settings = ChallengeSettings {
            baseline_days: 10,
            ..Default::default()
        };
        let txns = vec![
            Transaction::expense(day(12), Decimal::from(30), "Starbucks"),
            Transaction::expense(day(15), Decimal::from(15), "Blue Bottle"),
            Transaction::expense(day(15), Decimal::from(80), "Target"),
            // Before the window.
            Transaction::expense(day(1), Decimal::from(500), "Starbucks"),
            // Today is excluded.
            Transaction::expense(day(20), Decimal::from(500), "Starbucks"),
        ];
        let estimate = estimate_daily_saving(
            &ChallengeScope::Category(Category::Coffee),
            &txns,
            day(20),
            &settings,
        );
        assert_eq!(estimate, Decimal::new(450, 2));
    }

    #[test]
    fn estimate_is_floored_at_minimum() {
        let estimate = estimate_daily_saving(
            &ChallengeScope::Merchant("Netflix".to_string()),
            &[],
            day(20),
            &ChallengeSettings::default(),
        );
        assert_eq!(estimate, Decimal::ONE);
    }

    #[test]
    fn create_rejects_bad_duration_and_dedupes_hacks() {
        let ids = FixedIdGenerator::new([Id::from_string("ch-1")]);
        let params = NewChallenge {
            name: "No takeout".to_string(),
            scope: ChallengeScope::Category(Category::Dining),
            start_date: day(1),
            duration_days: 0,
            hacks: vec![],
        };
        let err = create_challenge(&ids, params.clone(), &[], day(1), &ChallengeSettings::default())
            .unwrap_err();
        assert_eq!(err, ChallengeError::InvalidDuration(0));

        let challenge = create_challenge(
            &ids,
            NewChallenge {
                duration_days: 14,
                hacks: vec![Hack::Roundups, Hack::SwearJar, Hack::Roundups],
                ..params
            },
            &[],
            day(1),
            &ChallengeSettings::default(),
        )
        .unwrap();
        assert_eq!(challenge.id.as_str(), "ch-1");
        assert_eq!(challenge.hacks, vec![Hack::Roundups, Hack::SwearJar]);
        assert_eq!(challenge.end_date(), day(14));
    }
}
