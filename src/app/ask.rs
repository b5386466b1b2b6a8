use anyhow::Result;

use crate::assistant::{Assistant, AssistantReply};
use crate::clock::Clock;
use crate::config::ResolvedConfig;
use crate::storage::Storage;

use super::{today, CustomerData};

/// Answer a chat message for one customer.
pub async fn ask(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    message: &str,
    clock: &dyn Clock,
) -> Result<AssistantReply> {
    if message.trim().is_empty() {
        anyhow::bail!("Message cannot be empty");
    }
    let mut data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    data.catch_up_challenges(storage, config, today).await?;

    let assistant = Assistant::new()?;
    let reply = assistant.respond(message, &data.context(config, today));
    tracing::debug!(customer = %data.profile.id, intent = ?reply.intent, "Assistant replied");
    Ok(reply)
}
