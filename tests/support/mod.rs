#![allow(dead_code)]

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendwise::app::{self, NewTransactionArgs};
use spendwise::clock::{DayBoundary, FixedClock};
use spendwise::config::ResolvedConfig;
use spendwise::models::{SequentialIdGenerator, TransactionKind};
use spendwise::storage::Storage;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Config rooted at `dir` that counts days in UTC, so `FixedClock::on`
/// always lands on the given date.
pub fn utc_config(dir: &Path) -> ResolvedConfig {
    let mut config = ResolvedConfig::with_data_dir(dir);
    config.day_boundary = DayBoundary::Named(chrono_tz::UTC);
    config
}

pub fn clock(date: NaiveDate) -> FixedClock {
    FixedClock::on(date)
}

pub async fn add_customer(storage: &dyn Storage, name: &str, today: NaiveDate) -> Result<String> {
    let ids = SequentialIdGenerator::new(name.to_lowercase());
    let out = app::add_customer_with(
        storage,
        name,
        30,
        Some(Decimal::from(4000)),
        &ids,
        &clock(today),
    )
    .await?;
    Ok(out["customer"]["id"].as_str().unwrap_or_default().to_string())
}

pub fn expense(date: NaiveDate, amount: &str, merchant: &str) -> NewTransactionArgs {
    NewTransactionArgs {
        date: Some(date),
        amount: amount.parse().unwrap(),
        kind: TransactionKind::Expense,
        merchant: merchant.to_string(),
        category: None,
        note: None,
    }
}
