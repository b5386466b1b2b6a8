use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

use super::Storage;
use crate::models::{Challenge, CustomerProfile, Id, SavingsGoal, Transaction};

/// JSON file-based storage implementation.
///
/// Directory structure:
/// ```text
/// data/
///   customers/
///     {id}/
///       profile.json
///       transactions.json
///       goals.json
///       challenges.json
/// ```
///
/// Each file is one key of the key-value store and is rewritten whole.
pub struct JsonFileStorage {
    base_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn customers_dir(&self) -> PathBuf {
        self.base_path.join("customers")
    }

    fn customer_dir(&self, id: &Id) -> Result<PathBuf> {
        if !Id::is_path_safe(id.as_str()) {
            anyhow::bail!("Unsafe customer id: {id:?}");
        }
        Ok(self.customers_dir().join(id.as_str()))
    }

    fn customer_file(&self, id: &Id, key: &str) -> Result<PathBuf> {
        Ok(self.customer_dir(id)?.join(format!("{key}.json")))
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create directory")?;
        }
        Ok(())
    }

    /// Read a JSON document.
    ///
    /// A missing file is `None`. A file that fails to parse is also `None`:
    /// the caller substitutes its default and the next write replaces the
    /// corrupt document.
    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "Malformed stored JSON; falling back to defaults"
                );
                Ok(None)
            }
        }
    }

    async fn read_list<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        Ok(self.read_json(path).await?.unwrap_or_default())
    }

    /// Write via a sibling temp file and rename so readers never see a torn document.
    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir(path).await?;
        let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    async fn list_dirs(&self, path: &Path) -> Result<Vec<Id>> {
        let mut ids = Vec::new();

        let mut entries = match fs::read_dir(path).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e).context("Failed to read directory"),
        };

        while let Some(entry) = entries.next_entry().await.context("Failed to read entry")? {
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if !file_type.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            match Id::from_string_checked(name) {
                Ok(id) => ids.push(id),
                Err(err) => tracing::warn!(error = %err, "Skipping customer directory"),
            }
        }

        ids.sort();
        Ok(ids)
    }
}

#[async_trait::async_trait]
impl Storage for JsonFileStorage {
    async fn list_customers(&self) -> Result<Vec<CustomerProfile>> {
        let ids = self.list_dirs(&self.customers_dir()).await?;
        let mut customers = Vec::new();

        for id in ids {
            if let Some(customer) = self.get_customer(&id).await? {
                customers.push(customer);
            }
        }

        Ok(customers)
    }

    async fn get_customer(&self, id: &Id) -> Result<Option<CustomerProfile>> {
        self.read_json(&self.customer_file(id, "profile")?).await
    }

    async fn save_customer(&self, customer: &CustomerProfile) -> Result<()> {
        self.write_json(&self.customer_file(&customer.id, "profile")?, customer)
            .await
    }

    async fn delete_customer(&self, id: &Id) -> Result<bool> {
        let dir = self.customer_dir(id)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", dir.display())),
        }
    }

    async fn get_transactions(&self, customer_id: &Id) -> Result<Vec<Transaction>> {
        self.read_list(&self.customer_file(customer_id, "transactions")?)
            .await
    }

    async fn save_transactions(&self, customer_id: &Id, txns: &[Transaction]) -> Result<()> {
        self.write_json(&self.customer_file(customer_id, "transactions")?, txns)
            .await
    }

    async fn get_goals(&self, customer_id: &Id) -> Result<Vec<SavingsGoal>> {
        self.read_list(&self.customer_file(customer_id, "goals")?).await
    }

    async fn save_goals(&self, customer_id: &Id, goals: &[SavingsGoal]) -> Result<()> {
        self.write_json(&self.customer_file(customer_id, "goals")?, goals)
            .await
    }

    async fn get_challenges(&self, customer_id: &Id) -> Result<Vec<Challenge>> {
        let mut challenges: Vec<Challenge> = self
            .read_list(&self.customer_file(customer_id, "challenges")?)
            .await?;
        for challenge in &mut challenges {
            let window = challenge.window_days();
            if challenge.duration_days != window {
                tracing::warn!(
                    customer = %customer_id,
                    challenge = %challenge.id,
                    stored = challenge.duration_days,
                    clamped = window,
                    "Challenge duration out of range"
                );
                challenge.duration_days = window;
            }
        }
        Ok(challenges)
    }

    async fn save_challenges(&self, customer_id: &Id, challenges: &[Challenge]) -> Result<()> {
        self.write_json(&self.customer_file(customer_id, "challenges")?, challenges)
            .await
    }
}
