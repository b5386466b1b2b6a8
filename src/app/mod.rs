mod ask;
mod challenges;
mod config;
mod customers;
mod goals;
mod reports;
mod seed;
mod transactions;
mod types;

use anyhow::Result;
use chrono::NaiveDate;

use crate::clock::Clock;
use crate::config::ResolvedConfig;
use crate::context::CustomerContext;
use crate::models::{Challenge, CustomerProfile, SavingsGoal, Transaction};
use crate::storage::{find_customer, Storage};

pub use ask::ask;
pub use challenges::{
    add_challenge, add_challenge_with, challenge_calendar, check_in_challenge, list_challenges,
    NewChallengeArgs,
};
pub use config::config_output;
pub use customers::{add_customer, add_customer_with, list_customers, remove_customer};
pub use goals::{add_goal, add_goal_with, contribute_goal, list_goals, withdraw_goal};
pub use reports::{
    benchmark_report, insights_report, kpis_report, month_over_month_report, recurring_report,
    reflection_report, reminders_report, tips_report,
};
pub use seed::{seed_demo_data, seed_demo_data_with};
pub use transactions::{
    add_transaction, add_transaction_with, delete_transaction, list_transactions,
    update_transaction, NewTransactionArgs, TransactionFilter,
};
pub use types::{
    AddTransactionOutput, ChallengeOutput, CustomerOutput, GoalOutput, TransactionOutput,
};

/// Today's date under the configured timezone.
fn today(config: &ResolvedConfig, clock: &dyn Clock) -> NaiveDate {
    config.day_boundary.today(clock)
}

async fn require_customer(storage: &dyn Storage, id_or_name: &str) -> Result<CustomerProfile> {
    match find_customer(storage, id_or_name).await? {
        Some(customer) => Ok(customer),
        None => anyhow::bail!("Customer not found: {id_or_name}"),
    }
}

/// Every stored document for one customer.
struct CustomerData {
    profile: CustomerProfile,
    transactions: Vec<Transaction>,
    goals: Vec<SavingsGoal>,
    challenges: Vec<Challenge>,
}

impl CustomerData {
    async fn load(storage: &dyn Storage, id_or_name: &str) -> Result<Self> {
        let profile = require_customer(storage, id_or_name).await?;
        let transactions = storage.get_transactions(&profile.id).await?;
        let goals = storage.get_goals(&profile.id).await?;
        let challenges = storage.get_challenges(&profile.id).await?;
        Ok(Self {
            profile,
            transactions,
            goals,
            challenges,
        })
    }

    /// Bring every challenge's check-ins up to `today`, persisting any change.
    async fn catch_up_challenges(
        &mut self,
        storage: &dyn Storage,
        config: &ResolvedConfig,
        today: NaiveDate,
    ) -> Result<()> {
        let mut changed = false;
        for challenge in &mut self.challenges {
            let recorded = crate::challenges::auto_checkin(
                challenge,
                &self.transactions,
                today,
                &config.challenges,
            );
            changed |= !recorded.is_empty();
        }
        if changed {
            storage
                .save_challenges(&self.profile.id, &self.challenges)
                .await?;
            tracing::info!(customer = %self.profile.id, "Recorded automatic check-ins");
        }
        Ok(())
    }

    fn context<'a>(&'a self, config: &'a ResolvedConfig, today: NaiveDate) -> CustomerContext<'a> {
        CustomerContext {
            profile: &self.profile,
            transactions: &self.transactions,
            goals: &self.goals,
            challenges: &self.challenges,
            today,
            analytics: &config.analytics,
            money: &config.display,
        }
    }
}
