use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::merchants;
use crate::models::{Category, Id, Transaction, TransactionKind};

/// Partial update for a stored transaction. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub kind: Option<TransactionKind>,
    pub raw_merchant: Option<String>,
    pub category: Option<Category>,
    /// `Some(None)` clears the note.
    pub note: Option<Option<String>>,
}

/// A customer's transactions, kept newest first.
#[derive(Debug, Clone, Default)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    pub fn new(mut transactions: Vec<Transaction>) -> Self {
        sort_newest_first(&mut transactions);
        Self { transactions }
    }

    pub fn into_vec(self) -> Vec<Transaction> {
        self.transactions
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: &Id) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.id == id)
    }

    /// Insert a transaction. A transaction with the same id is replaced.
    pub fn add(&mut self, tx: Transaction) -> anyhow::Result<()> {
        if tx.amount <= Decimal::ZERO {
            anyhow::bail!("Transaction amount must be positive (got {})", tx.amount);
        }
        self.transactions.retain(|t| t.id != tx.id);
        self.transactions.push(tx);
        sort_newest_first(&mut self.transactions);
        Ok(())
    }

    /// Apply a patch. Returns `Ok(false)` when the id is unknown.
    ///
    /// A new raw merchant re-runs normalization; the category follows it
    /// unless the patch sets one explicitly.
    pub fn update(&mut self, id: &Id, patch: TransactionPatch) -> anyhow::Result<bool> {
        if let Some(amount) = patch.amount {
            if amount <= Decimal::ZERO {
                anyhow::bail!("Transaction amount must be positive (got {amount})");
            }
        }
        let Some(tx) = self.transactions.iter_mut().find(|t| &t.id == id) else {
            return Ok(false);
        };

        if let Some(date) = patch.date {
            tx.date = date;
        }
        if let Some(amount) = patch.amount {
            tx.amount = amount;
        }
        if let Some(kind) = patch.kind {
            tx.kind = kind;
            if kind == TransactionKind::Income {
                tx.category = Category::Income;
            } else if tx.category == Category::Income {
                tx.category = merchants::normalize(&tx.raw_merchant).category;
                if tx.category == Category::Income {
                    tx.category = Category::Other;
                }
            }
        }
        if let Some(raw) = patch.raw_merchant {
            let normalized = merchants::normalize(&raw);
            tx.merchant = normalized.name;
            tx.raw_merchant = raw;
            if patch.category.is_none() && tx.kind == TransactionKind::Expense {
                tx.category = if normalized.category == Category::Income {
                    Category::Other
                } else {
                    normalized.category
                };
            }
        }
        if let Some(category) = patch.category {
            tx.category = category;
        }
        if let Some(note) = patch.note {
            tx.note = note.filter(|n| !n.trim().is_empty());
        }

        sort_newest_first(&mut self.transactions);
        Ok(true)
    }

    pub fn delete(&mut self, id: &Id) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| &t.id != id);
        self.transactions.len() != before
    }

    /// Transactions dated within `[start, end]` inclusive.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect()
    }

    pub fn on(&self, date: NaiveDate) -> Vec<&Transaction> {
        self.between(date, date)
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_expense())
    }
}

/// Stable sort keeps insertion order for same-day transactions.
fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}
