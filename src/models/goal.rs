use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Id;

/// A single deposit into (positive) or withdrawal from (negative) a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: Id,
    pub name: String,
    pub target: Decimal,
    #[serde(default)]
    pub saved: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub created_on: NaiveDate,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

impl SavingsGoal {
    pub fn is_complete(&self) -> bool {
        self.saved >= self.target
    }

    pub fn last_contribution(&self) -> Option<NaiveDate> {
        self.contributions
            .iter()
            .filter(|c| c.amount > Decimal::ZERO)
            .map(|c| c.date)
            .max()
    }
}
