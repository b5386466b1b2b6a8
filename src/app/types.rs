use chrono::NaiveDate;
use serde::Serialize;

use crate::challenges::ChallengeProgress;
use crate::goals::GoalProgress;
use crate::models::{Challenge, CustomerProfile, Hack, SavingsGoal, Transaction};

/// JSON output for customers
#[derive(Serialize)]
pub struct CustomerOutput {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub age_band: String,
    pub monthly_income: String,
    pub created_at: String,
}

impl From<&CustomerProfile> for CustomerOutput {
    fn from(c: &CustomerProfile) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            age: c.age,
            age_band: c.age_band().label().to_string(),
            monthly_income: c.monthly_income.to_string(),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// JSON output for transactions
#[derive(Serialize)]
pub struct TransactionOutput {
    pub id: String,
    pub date: NaiveDate,
    pub kind: String,
    pub amount: String,
    pub amount_display: String,
    pub merchant: String,
    pub raw_merchant: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TransactionOutput {
    pub(super) fn new(tx: &Transaction, money: &crate::format::MoneyFormat) -> Self {
        Self {
            id: tx.id.to_string(),
            date: tx.date,
            kind: if tx.is_income() { "income" } else { "expense" }.to_string(),
            amount: tx.amount.to_string(),
            amount_display: money.format(tx.signed_amount()),
            merchant: tx.merchant.clone(),
            raw_merchant: tx.raw_merchant.clone(),
            category: tx.category.to_string(),
            note: tx.note.clone(),
        }
    }
}

/// JSON output for a newly recorded transaction and the nudges it triggered.
#[derive(Serialize)]
pub struct AddTransactionOutput {
    pub success: bool,
    pub transaction: TransactionOutput,
    pub nudges: Vec<String>,
}

/// JSON output for savings goals
#[derive(Serialize)]
pub struct GoalOutput {
    pub id: String,
    pub name: String,
    pub target: String,
    pub saved: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub created_on: NaiveDate,
    pub progress: GoalProgress,
}

impl GoalOutput {
    pub(super) fn new(goal: &SavingsGoal, today: NaiveDate) -> Self {
        Self {
            id: goal.id.to_string(),
            name: goal.name.clone(),
            target: goal.target.to_string(),
            saved: goal.saved.to_string(),
            deadline: goal.deadline,
            created_on: goal.created_on,
            progress: crate::goals::progress(goal, today),
        }
    }
}

/// JSON output for challenges
#[derive(Serialize)]
pub struct ChallengeOutput {
    pub id: String,
    pub name: String,
    pub scope: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: u32,
    pub estimated_daily_saving: String,
    pub hacks: Vec<&'static str>,
    pub progress: ChallengeProgress,
}

impl ChallengeOutput {
    pub(super) fn new(challenge: &Challenge, today: NaiveDate) -> Self {
        Self {
            id: challenge.id.to_string(),
            name: challenge.name.clone(),
            scope: challenge.scope.label(),
            start_date: challenge.start_date,
            end_date: challenge.end_date(),
            duration_days: challenge.window_days(),
            estimated_daily_saving: challenge.estimated_daily_saving.to_string(),
            hacks: challenge.hacks.iter().map(|h: &Hack| h.as_str()).collect(),
            progress: crate::challenges::progress(challenge, today),
        }
    }
}
