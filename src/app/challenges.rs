use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

use crate::challenges::{self, DayCell, NewChallenge};
use crate::clock::{Clock, SystemClock};
use crate::config::ResolvedConfig;
use crate::merchants;
use crate::models::{Category, Challenge, ChallengeScope, Hack, IdGenerator, UuidIdGenerator};
use crate::storage::Storage;

use super::{today, ChallengeOutput, CustomerData};

/// Fields for starting a challenge.
#[derive(Debug, Clone)]
pub struct NewChallengeArgs {
    /// Optional; defaults to "No <scope>".
    pub name: Option<String>,
    /// `category:<name>`, `merchant:<name>`, or free text resolved as a
    /// category first and a merchant second.
    pub scope: String,
    /// Defaults to today.
    pub start_date: Option<NaiveDate>,
    pub duration_days: u32,
    pub hacks: Vec<Hack>,
}

fn parse_scope(text: &str) -> Result<ChallengeScope> {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix("category:") {
        let category = rest
            .parse::<Category>()
            .or_else(|_| merchants::category_for_keyword(rest).context("Unknown category"))
            .with_context(|| format!("Invalid challenge scope: {text}"))?;
        return Ok(ChallengeScope::Category(category));
    }
    if let Some(rest) = text.strip_prefix("merchant:") {
        let rest = rest.trim();
        if rest.is_empty() {
            anyhow::bail!("Merchant scope needs a name");
        }
        let name = merchants::known_merchant(rest).map_or_else(|| rest.to_string(), str::to_string);
        return Ok(ChallengeScope::Merchant(name));
    }
    if let Some(category) = merchants::category_for_keyword(text) {
        return Ok(ChallengeScope::Category(category));
    }
    match merchants::known_merchant(text) {
        Some(name) => Ok(ChallengeScope::Merchant(name.to_string())),
        None if text.is_empty() => anyhow::bail!("Challenge scope cannot be empty"),
        None => Ok(ChallengeScope::Merchant(text.to_string())),
    }
}

fn find_challenge<'a>(all: &'a mut [Challenge], id_or_name: &str) -> Result<&'a mut Challenge> {
    all.iter_mut()
        .find(|c| c.id.as_str() == id_or_name || c.name.eq_ignore_ascii_case(id_or_name))
        .with_context(|| format!("Challenge not found: {id_or_name}"))
}

pub async fn add_challenge(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    args: NewChallengeArgs,
) -> Result<serde_json::Value> {
    add_challenge_with(storage, config, customer, args, &UuidIdGenerator, &SystemClock).await
}

pub async fn add_challenge_with(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    args: NewChallengeArgs,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let mut data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    let scope = parse_scope(&args.scope)?;
    let name = args
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("No {}", scope.label().to_lowercase()));

    let start_date = args.start_date.unwrap_or(today);
    let mut challenge = challenges::create_challenge(
        ids,
        NewChallenge {
            name,
            scope,
            start_date,
            duration_days: args.duration_days,
            hacks: args.hacks,
        },
        &data.transactions,
        today,
        &config.challenges,
    )?;
    challenges::auto_checkin(&mut challenge, &data.transactions, today, &config.challenges);

    let output = ChallengeOutput::new(&challenge, today);
    data.challenges.push(challenge);
    storage
        .save_challenges(&data.profile.id, &data.challenges)
        .await
        .context("Failed to save challenges")?;
    tracing::info!(customer = %data.profile.id, challenge = %output.id, "Started challenge");

    Ok(serde_json::json!({
        "success": true,
        "challenge": output,
    }))
}

/// Manual check-in for `date` (today when omitted).
pub async fn check_in_challenge(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    challenge: &str,
    date: Option<NaiveDate>,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let mut data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    let date = date.unwrap_or(today);

    let target = find_challenge(&mut data.challenges, challenge)?;
    let checkin = challenges::check_in(target, date, &data.transactions, today, &config.challenges)?;
    let output = ChallengeOutput::new(target, today);

    storage
        .save_challenges(&data.profile.id, &data.challenges)
        .await?;
    tracing::info!(
        customer = %data.profile.id,
        challenge = %output.id,
        %date,
        status = ?checkin.status,
        "Checked in"
    );

    Ok(serde_json::json!({
        "success": true,
        "checkin": checkin,
        "challenge": output,
    }))
}

/// Every challenge with its derived progress. Elapsed days without a
/// check-in are recorded first.
pub async fn list_challenges(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    clock: &dyn Clock,
) -> Result<Vec<ChallengeOutput>> {
    let mut data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    data.catch_up_challenges(storage, config, today).await?;
    Ok(data
        .challenges
        .iter()
        .map(|c| ChallengeOutput::new(c, today))
        .collect())
}

/// Day cells for a challenge. Without an explicit range this covers the
/// whole challenge window.
pub async fn challenge_calendar(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    customer: &str,
    challenge: &str,
    range: Option<(NaiveDate, NaiveDate)>,
    clock: &dyn Clock,
) -> Result<Vec<DayCell>> {
    let mut data = CustomerData::load(storage, customer).await?;
    let today = today(config, clock);
    data.catch_up_challenges(storage, config, today).await?;

    let target = find_challenge(&mut data.challenges, challenge)?;
    let (from, to) = range.unwrap_or((target.start_date, target.end_date()));
    if to < from {
        anyhow::bail!("Calendar range ends before it starts ({from} to {to})");
    }
    if (to - from) > Duration::days(366) {
        anyhow::bail!("Calendar range is limited to one year");
    }
    Ok(challenges::calendar(target, from, to, today))
}
