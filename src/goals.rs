//! Savings goals: deposits, withdrawals and schedule tracking.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Contribution, IdGenerator, SavingsGoal};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GoalError {
    #[error("Amount must be positive (got {0})")]
    NonPositiveAmount(Decimal),
    #[error("Cannot withdraw {requested}: only {available} saved")]
    Overdraw {
        requested: Decimal,
        available: Decimal,
    },
    #[error("Deadline {deadline} is before the goal was created ({created_on})")]
    DeadlineInPast {
        deadline: NaiveDate,
        created_on: NaiveDate,
    },
}

pub fn create_goal(
    ids: &dyn IdGenerator,
    name: impl Into<String>,
    target: Decimal,
    deadline: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<SavingsGoal, GoalError> {
    if target <= Decimal::ZERO {
        return Err(GoalError::NonPositiveAmount(target));
    }
    if let Some(deadline) = deadline {
        if deadline < today {
            return Err(GoalError::DeadlineInPast {
                deadline,
                created_on: today,
            });
        }
    }
    Ok(SavingsGoal {
        id: ids.new_id(),
        name: name.into(),
        target,
        saved: Decimal::ZERO,
        deadline,
        created_on: today,
        contributions: Vec::new(),
    })
}

pub fn contribute(goal: &mut SavingsGoal, amount: Decimal, date: NaiveDate) -> Result<(), GoalError> {
    if amount <= Decimal::ZERO {
        return Err(GoalError::NonPositiveAmount(amount));
    }
    goal.saved += amount;
    goal.contributions.push(Contribution { date, amount });
    Ok(())
}

pub fn withdraw(goal: &mut SavingsGoal, amount: Decimal, date: NaiveDate) -> Result<(), GoalError> {
    if amount <= Decimal::ZERO {
        return Err(GoalError::NonPositiveAmount(amount));
    }
    if amount > goal.saved {
        return Err(GoalError::Overdraw {
            requested: amount,
            available: goal.saved,
        });
    }
    goal.saved -= amount;
    goal.contributions.push(Contribution {
        date,
        amount: -amount,
    });
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub percent: u32,
    pub remaining: Decimal,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_left: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_monthly: Option<Decimal>,
    /// Saved amount is at or above a straight line from creation to deadline.
    pub on_track: bool,
}

/// Whole calendar months from `from` to `to`, counting a partial month as one.
fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let months = if to.day() > from.day() { months + 1 } else { months };
    months.max(1) as u32
}

pub fn progress(goal: &SavingsGoal, today: NaiveDate) -> GoalProgress {
    let complete = goal.is_complete();
    let remaining = (goal.target - goal.saved).max(Decimal::ZERO);
    let percent = if goal.target > Decimal::ZERO {
        let pct = (goal.saved * Decimal::ONE_HUNDRED / goal.target).floor();
        pct.to_u32().unwrap_or(0).min(100)
    } else {
        100
    };

    let Some(deadline) = goal.deadline else {
        return GoalProgress {
            percent,
            remaining,
            complete,
            months_left: None,
            required_monthly: None,
            on_track: true,
        };
    };

    let months_left = months_between(today, deadline);
    let required_monthly = if complete {
        Some(Decimal::ZERO)
    } else if months_left == 0 {
        Some(remaining)
    } else {
        Some((remaining / Decimal::from(months_left)).round_dp(2))
    };

    let total_days = (deadline - goal.created_on).num_days();
    let elapsed_days = (today - goal.created_on).num_days().clamp(0, total_days.max(0));
    let expected = if total_days <= 0 {
        goal.target
    } else {
        goal.target * Decimal::from(elapsed_days) / Decimal::from(total_days)
    };

    GoalProgress {
        percent,
        remaining,
        complete,
        months_left: Some(months_left),
        required_monthly,
        on_track: complete || goal.saved >= expected.round_dp(2),
    }
}
