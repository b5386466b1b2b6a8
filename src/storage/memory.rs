//! In-memory storage implementation for testing.

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::models::{Challenge, CustomerProfile, Id, SavingsGoal, Transaction};

use super::Storage;

/// In-memory storage for testing purposes.
pub struct MemoryStorage {
    customers: Mutex<HashMap<Id, CustomerProfile>>,
    transactions: Mutex<HashMap<Id, Vec<Transaction>>>,
    goals: Mutex<HashMap<Id, Vec<SavingsGoal>>>,
    challenges: Mutex<HashMap<Id, Vec<Challenge>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            customers: Mutex::new(HashMap::new()),
            transactions: Mutex::new(HashMap::new()),
            goals: Mutex::new(HashMap::new()),
            challenges: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn list_customers(&self) -> Result<Vec<CustomerProfile>> {
        let customers = self.customers.lock().await;
        let mut out: Vec<CustomerProfile> = customers.values().cloned().collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn get_customer(&self, id: &Id) -> Result<Option<CustomerProfile>> {
        let customers = self.customers.lock().await;
        Ok(customers.get(id).cloned())
    }

    async fn save_customer(&self, customer: &CustomerProfile) -> Result<()> {
        let mut customers = self.customers.lock().await;
        customers.insert(customer.id.clone(), customer.clone());
        Ok(())
    }

    async fn delete_customer(&self, id: &Id) -> Result<bool> {
        let removed = self.customers.lock().await.remove(id).is_some();
        self.transactions.lock().await.remove(id);
        self.goals.lock().await.remove(id);
        self.challenges.lock().await.remove(id);
        Ok(removed)
    }

    async fn get_transactions(&self, customer_id: &Id) -> Result<Vec<Transaction>> {
        let txns = self.transactions.lock().await;
        Ok(txns.get(customer_id).cloned().unwrap_or_default())
    }

    async fn save_transactions(&self, customer_id: &Id, txns: &[Transaction]) -> Result<()> {
        let mut all = self.transactions.lock().await;
        all.insert(customer_id.clone(), txns.to_vec());
        Ok(())
    }

    async fn get_goals(&self, customer_id: &Id) -> Result<Vec<SavingsGoal>> {
        let goals = self.goals.lock().await;
        Ok(goals.get(customer_id).cloned().unwrap_or_default())
    }

    async fn save_goals(&self, customer_id: &Id, goals: &[SavingsGoal]) -> Result<()> {
        let mut all = self.goals.lock().await;
        all.insert(customer_id.clone(), goals.to_vec());
        Ok(())
    }

    async fn get_challenges(&self, customer_id: &Id) -> Result<Vec<Challenge>> {
        let challenges = self.challenges.lock().await;
        Ok(challenges.get(customer_id).cloned().unwrap_or_default())
    }

    async fn save_challenges(&self, customer_id: &Id, challenges: &[Challenge]) -> Result<()> {
        let mut all = self.challenges.lock().await;
        all.insert(customer_id.clone(), challenges.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_customer_drops_their_documents() -> Result<()> {
        let storage = MemoryStorage::new();
        let customer = CustomerProfile::new("Jo", 52);
        storage.save_customer(&customer).await?;
        storage.save_goals(&customer.id, &[]).await?;

        assert!(storage.delete_customer(&customer.id).await?);
        assert!(storage.get_customer(&customer.id).await?.is_none());
        assert!(!storage.delete_customer(&customer.id).await?);
        Ok(())
    }
}
