use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::assistant::nudges_after_transaction;
use crate::clock::{Clock, SystemClock};
use crate::config::ResolvedConfig;
use crate::ledger::{TransactionLedger, TransactionPatch};
use crate::models::{Category, Id, IdGenerator, Transaction, TransactionKind, UuidIdGenerator};
use crate::storage::Storage;

use super::{require_customer, today, AddTransactionOutput, TransactionOutput};

/// Fields for recording a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransactionArgs {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub merchant: String,
    /// Overrides the category derived from the merchant.
    pub category: Option<Category>,
    pub note: Option<String>,
}

/// Optional filters for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<Category>,
    pub limit: Option<usize>,
}

pub async fn add_transaction(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    args: NewTransactionArgs,
) -> Result<AddTransactionOutput> {
    add_transaction_with(storage, config, customer, args, &UuidIdGenerator, &SystemClock).await
}

/// Record a transaction. An expense that breaks an active challenge marks
/// that day missed and returns a nudge for each broken challenge.
pub async fn add_transaction_with(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    args: NewTransactionArgs,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<AddTransactionOutput> {
    let profile = require_customer(storage, customer).await?;
    let today = today(config, clock);
    let date = args.date.unwrap_or(today);
    if date > today {
        anyhow::bail!("Transaction date {date} is in the future");
    }
    if args.merchant.trim().is_empty() {
        anyhow::bail!("Merchant cannot be empty");
    }

    if args.amount <= Decimal::ZERO {
        anyhow::bail!("Transaction amount must be positive (got {})", args.amount);
    }
    let mut tx =
        Transaction::new_with_generator(ids, date, args.amount, args.kind, args.merchant.trim());
    if let Some(category) = args.category {
        tx = tx.with_category(category);
    }
    if let Some(note) = args.note.filter(|n| !n.trim().is_empty()) {
        tx = tx.with_note(note);
    }

    let mut ledger = TransactionLedger::new(storage.get_transactions(&profile.id).await?);
    ledger.add(tx.clone())?;
    storage
        .save_transactions(&profile.id, ledger.as_slice())
        .await
        .context("Failed to save transactions")?;
    tracing::info!(customer = %profile.id, transaction = %tx.id, "Added transaction");

    let mut challenges = storage.get_challenges(&profile.id).await?;
    let nudges = nudges_after_transaction(&tx, &challenges, &config.challenges, &config.display);
    if !nudges.is_empty() {
        for challenge in &mut challenges {
            if challenge.contains(tx.date) && challenge.scope.is_violated_by(&tx) {
                crate::challenges::check_in(
                    challenge,
                    tx.date,
                    ledger.as_slice(),
                    today,
                    &config.challenges,
                )?;
            }
        }
        storage.save_challenges(&profile.id, &challenges).await?;
        tracing::info!(
            customer = %profile.id,
            broken = nudges.len(),
            "Expense broke active challenges"
        );
    }

    Ok(AddTransactionOutput {
        success: true,
        transaction: TransactionOutput::new(&tx, &config.display),
        nudges,
    })
}

/// Re-check recorded challenge days on `dates` against the current ledger.
async fn refresh_challenges(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &Id,
    dates: &[NaiveDate],
    transactions: &[Transaction],
    today: NaiveDate,
) -> Result<()> {
    let mut challenges = storage.get_challenges(customer).await?;
    let mut changed = false;
    for challenge in &mut challenges {
        for &date in dates {
            if challenge.contains(date) {
                changed |= crate::challenges::reevaluate(
                    challenge,
                    date,
                    transactions,
                    today,
                    &config.challenges,
                );
            }
        }
        let recorded =
            crate::challenges::auto_checkin(challenge, transactions, today, &config.challenges);
        changed |= !recorded.is_empty();
    }
    if changed {
        storage
            .save_challenges(customer, &challenges)
            .await
            .context("Failed to save challenges")?;
        tracing::info!(customer = %customer, "Re-evaluated challenge days");
    }
    Ok(())
}

pub async fn update_transaction(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    transaction_id: &str,
    patch: TransactionPatch,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let profile = require_customer(storage, customer).await?;
    let id = Id::from_string_checked(transaction_id)
        .with_context(|| format!("Invalid transaction id: {transaction_id}"))?;
    let today = today(config, clock);
    if let Some(date) = patch.date.filter(|d| *d > today) {
        anyhow::bail!("Transaction date {date} is in the future");
    }

    let mut ledger = TransactionLedger::new(storage.get_transactions(&profile.id).await?);
    let Some(old_date) = ledger.get(&id).map(|tx| tx.date) else {
        return Ok(serde_json::json!({
            "success": false,
            "error": "Transaction not found",
            "id": transaction_id
        }));
    };
    ledger.update(&id, patch)?;
    storage.save_transactions(&profile.id, ledger.as_slice()).await?;
    tracing::info!(customer = %profile.id, transaction = %id, "Updated transaction");

    let mut dates = vec![old_date];
    if let Some(new_date) = ledger.get(&id).map(|tx| tx.date) {
        if new_date != old_date {
            dates.push(new_date);
        }
    }
    refresh_challenges(storage, config, &profile.id, &dates, ledger.as_slice(), today).await?;

    let updated = ledger
        .get(&id)
        .map(|tx| TransactionOutput::new(tx, &config.display));
    Ok(serde_json::json!({
        "success": true,
        "transaction": updated,
    }))
}

pub async fn delete_transaction(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    transaction_id: &str,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let profile = require_customer(storage, customer).await?;
    let id = Id::from_string_checked(transaction_id)
        .with_context(|| format!("Invalid transaction id: {transaction_id}"))?;

    let mut ledger = TransactionLedger::new(storage.get_transactions(&profile.id).await?);
    let old_date = ledger.get(&id).map(|tx| tx.date);
    let deleted = ledger.delete(&id);
    if deleted {
        storage.save_transactions(&profile.id, ledger.as_slice()).await?;
        tracing::info!(customer = %profile.id, transaction = %id, "Deleted transaction");
        if let Some(date) = old_date {
            let today = today(config, clock);
            refresh_challenges(storage, config, &profile.id, &[date], ledger.as_slice(), today)
                .await?;
        }
    }
    Ok(serde_json::json!({
        "success": deleted,
        "id": transaction_id,
    }))
}

pub async fn list_transactions(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    filter: &TransactionFilter,
) -> Result<Vec<TransactionOutput>> {
    let profile = require_customer(storage, customer).await?;
    let ledger = TransactionLedger::new(storage.get_transactions(&profile.id).await?);
    let limit = filter.limit.unwrap_or(usize::MAX);

    Ok(ledger
        .as_slice()
        .iter()
        .filter(|t| filter.from.map_or(true, |from| t.date >= from))
        .filter(|t| filter.to.map_or(true, |to| t.date <= to))
        .filter(|t| filter.category.map_or(true, |c| t.category == c))
        .take(limit)
        .map(|t| TransactionOutput::new(t, &config.display))
        .collect())
}
