mod json_file;
mod lookup;
mod memory;

pub use json_file::JsonFileStorage;
pub use lookup::find_customer;
pub use memory::MemoryStorage;

use anyhow::Result;

use crate::models::{Challenge, CustomerProfile, Id, SavingsGoal, Transaction};

/// Storage trait for persisting per-customer documents.
///
/// Every document is read and written whole, the way a browser key-value
/// store holds one JSON blob per key. Readers never fail on a malformed
/// document; they fall back to the default value.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    // Customers
    async fn list_customers(&self) -> Result<Vec<CustomerProfile>>;
    async fn get_customer(&self, id: &Id) -> Result<Option<CustomerProfile>>;
    async fn save_customer(&self, customer: &CustomerProfile) -> Result<()>;
    /// Remove a customer and all of their documents.
    async fn delete_customer(&self, id: &Id) -> Result<bool>;

    // Transactions
    async fn get_transactions(&self, customer_id: &Id) -> Result<Vec<Transaction>>;
    async fn save_transactions(&self, customer_id: &Id, txns: &[Transaction]) -> Result<()>;

    // Goals
    async fn get_goals(&self, customer_id: &Id) -> Result<Vec<SavingsGoal>>;
    async fn save_goals(&self, customer_id: &Id, goals: &[SavingsGoal]) -> Result<()>;

    // Challenges
    async fn get_challenges(&self, customer_id: &Id) -> Result<Vec<Challenge>>;
    async fn save_challenges(&self, customer_id: &Id, challenges: &[Challenge]) -> Result<()>;
}
