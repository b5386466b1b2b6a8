use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Spending category assigned by the merchant normalizer or by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Groceries,
    Dining,
    Coffee,
    Transport,
    Shopping,
    Entertainment,
    Subscriptions,
    Bills,
    Health,
    Travel,
    Income,
    Transfers,
    Other,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Groceries,
        Category::Dining,
        Category::Coffee,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Subscriptions,
        Category::Bills,
        Category::Health,
        Category::Travel,
        Category::Income,
        Category::Transfers,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Groceries => "groceries",
            Category::Dining => "dining",
            Category::Coffee => "coffee",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::Subscriptions => "subscriptions",
            Category::Bills => "bills",
            Category::Health => "health",
            Category::Travel => "travel",
            Category::Income => "income",
            Category::Transfers => "transfers",
            Category::Other => "other",
        }
    }

    /// Human label used in generated text.
    pub fn label(self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Dining => "Dining out",
            Category::Coffee => "Coffee",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Subscriptions => "Subscriptions",
            Category::Bills => "Bills & utilities",
            Category::Health => "Health",
            Category::Travel => "Travel",
            Category::Income => "Income",
            Category::Transfers => "Transfers",
            Category::Other => "Other",
        }
    }

    /// Discretionary categories are the ones challenges and tips target.
    pub fn is_discretionary(self) -> bool {
        matches!(
            self,
            Category::Dining
                | Category::Coffee
                | Category::Shopping
                | Category::Entertainment
                | Category::Subscriptions
                | Category::Travel
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
