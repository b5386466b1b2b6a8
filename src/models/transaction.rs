use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Category, Id, IdGenerator, UuidIdGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
}

/// A single money movement for a customer.
///
/// `amount` is always a positive magnitude; direction lives in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Id,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub kind: TransactionKind,
    /// Canonical merchant name produced by the normalizer.
    pub merchant: String,
    /// Merchant string as entered or imported.
    pub raw_merchant: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    pub fn expense(date: NaiveDate, amount: Decimal, raw_merchant: impl Into<String>) -> Self {
        Self::new_with_generator(&UuidIdGenerator, date, amount, TransactionKind::Expense, raw_merchant)
    }

    pub fn income(date: NaiveDate, amount: Decimal, raw_merchant: impl Into<String>) -> Self {
        Self::new_with_generator(&UuidIdGenerator, date, amount, TransactionKind::Income, raw_merchant)
    }

    /// Builds a transaction with merchant and category resolved by the normalizer.
    pub fn new_with_generator(
        ids: &dyn IdGenerator,
        date: NaiveDate,
        amount: Decimal,
        kind: TransactionKind,
        raw_merchant: impl Into<String>,
    ) -> Self {
        let raw_merchant = raw_merchant.into();
        let normalized = crate::merchants::normalize(&raw_merchant);
        let category = match kind {
            TransactionKind::Income => Category::Income,
            TransactionKind::Expense if normalized.category == Category::Income => Category::Other,
            TransactionKind::Expense => normalized.category,
        };
        Self {
            id: ids.new_id(),
            date,
            amount: amount.abs(),
            kind,
            merchant: normalized.name,
            raw_merchant,
            category,
            note: None,
        }
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Signed amount: negative for expenses, positive for income.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Expense => -self.amount,
            TransactionKind::Income => self.amount,
        }
    }
}
