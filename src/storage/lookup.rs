use anyhow::Result;

use crate::models::{CustomerProfile, Id};

use super::Storage;

/// Find a customer by id, falling back to a case-insensitive name match.
pub async fn find_customer(
    storage: &dyn Storage,
    id_or_name: &str,
) -> Result<Option<CustomerProfile>> {
    if Id::is_path_safe(id_or_name) {
        let id = Id::from_string(id_or_name);
        if let Some(customer) = storage.get_customer(&id).await? {
            return Ok(Some(customer));
        }
    }

    let customers = storage.list_customers().await?;
    let mut matches: Vec<CustomerProfile> = customers
        .into_iter()
        .filter(|c| c.name.eq_ignore_ascii_case(id_or_name))
        .collect();

    if matches.is_empty() {
        return Ok(None);
    }

    if matches.len() > 1 {
        let ids: Vec<String> = matches.iter().map(|c| c.id.to_string()).collect();
        anyhow::bail!("Multiple customers named '{id_or_name}'. Use an ID instead: {ids:?}");
    }

    Ok(matches.pop())
}
