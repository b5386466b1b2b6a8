use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::clock::{Clock, SystemClock};
use crate::models::{CustomerProfile, IdGenerator, UuidIdGenerator};
use crate::storage::Storage;

use super::{require_customer, CustomerOutput};

pub async fn add_customer(
    storage: &dyn Storage,
    name: &str,
    age: u32,
    monthly_income: Option<Decimal>,
) -> Result<serde_json::Value> {
    add_customer_with(storage, name, age, monthly_income, &UuidIdGenerator, &SystemClock).await
}

pub async fn add_customer_with(
    storage: &dyn Storage,
    name: &str,
    age: u32,
    monthly_income: Option<Decimal>,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Customer name cannot be empty");
    }
    if !(13..=120).contains(&age) {
        anyhow::bail!("Age must be between 13 and 120 (got {age})");
    }
    if let Some(income) = monthly_income {
        if income < Decimal::ZERO {
            anyhow::bail!("Monthly income cannot be negative (got {income})");
        }
    }

    let existing = storage
        .list_customers()
        .await?
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(name));
    if existing.is_some() {
        anyhow::bail!("Customer name already exists: {name}");
    }

    let customer = CustomerProfile::new_with_generator(ids, clock, name, age)
        .with_monthly_income(monthly_income.unwrap_or_default());
    storage
        .save_customer(&customer)
        .await
        .context("Failed to save customer")?;
    tracing::info!(customer = %customer.id, "Added customer");

    Ok(serde_json::json!({
        "success": true,
        "customer": CustomerOutput::from(&customer),
    }))
}

pub async fn list_customers(storage: &dyn Storage) -> Result<Vec<CustomerOutput>> {
    let customers = storage.list_customers().await?;
    Ok(customers.iter().map(CustomerOutput::from).collect())
}

pub async fn remove_customer(storage: &dyn Storage, id_or_name: &str) -> Result<serde_json::Value> {
    let customer = require_customer(storage, id_or_name).await?;
    let deleted = storage.delete_customer(&customer.id).await?;
    if deleted {
        tracing::info!(customer = %customer.id, "Removed customer");
    }
    Ok(serde_json::json!({
        "success": deleted,
        "customer": {
            "id": customer.id.to_string(),
            "name": customer.name,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::SequentialIdGenerator;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn add_list_and_remove() -> Result<()> {
        let storage = MemoryStorage::new();
        let ids = SequentialIdGenerator::new("cust");
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());

        let out = add_customer_with(&storage, "Maya", 29, Some(Decimal::from(4000)), &ids, &clock)
            .await?;
        assert_eq!(out["customer"]["id"], "cust-1");
        assert_eq!(out["customer"]["age_band"], "25-34");

        let dup = add_customer_with(&storage, "maya", 30, None, &ids, &clock).await;
        assert!(dup.is_err());

        assert_eq!(list_customers(&storage).await?.len(), 1);
        let removed = remove_customer(&storage, "Maya").await?;
        assert_eq!(removed["success"], true);
        assert!(list_customers(&storage).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn rejects_blank_name_and_bad_age() {
        let storage = MemoryStorage::new();
        assert!(add_customer(&storage, "  ", 30, None).await.is_err());
        assert!(add_customer(&storage, "Kid", 5, None).await.is_err());
    }
}
