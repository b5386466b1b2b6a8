use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use spendwise::app::{self, NewChallengeArgs, NewTransactionArgs, TransactionFilter};
use spendwise::clock::SystemClock;
use spendwise::config::{default_config_path, ResolvedConfig};
use spendwise::ledger::TransactionPatch;
use spendwise::models::{Category, Hack, TransactionKind};
use spendwise::storage::JsonFileStorage;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn parse_hack(s: &str) -> Result<Hack, String> {
    Hack::parse(s).ok_or_else(|| {
        format!("Unknown hack '{s}' (expected roundups, smart_save, swear_jar or set_forget)")
    })
}

#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Local-first personal finance assistant")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show current configuration
    Config,
    /// Write three demo customers with about 90 days of history
    Seed,
    /// Manage customers
    #[command(subcommand)]
    Customer(CustomerCommand),
    /// Record and edit transactions
    #[command(subcommand)]
    #[command(name = "tx")]
    Transaction(TransactionCommand),
    /// Savings goals
    #[command(subcommand)]
    Goal(GoalCommand),
    /// Spending challenges
    #[command(subcommand)]
    Challenge(ChallengeCommand),
    /// Analytics, benchmarks and nudges
    #[command(subcommand)]
    Report(ReportCommand),
    /// Ask the assistant a question
    Ask {
        /// Customer id or name
        customer: String,
        /// Free-text message, e.g. "how much did I spend on coffee this week?"
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CustomerCommand {
    Add {
        name: String,
        #[arg(long)]
        age: u32,
        /// Expected monthly take-home pay
        #[arg(long)]
        income: Option<Decimal>,
    },
    List,
    Remove {
        /// Customer id or name
        customer: String,
    },
}

#[derive(Args)]
struct TransactionFields {
    /// Transaction date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Override the category derived from the merchant
    #[arg(long)]
    category: Option<Category>,
    #[arg(long)]
    note: Option<String>,
}

#[derive(Subcommand)]
enum TransactionCommand {
    Add {
        customer: String,
        amount: Decimal,
        merchant: String,
        /// Record as income instead of an expense
        #[arg(long)]
        income: bool,
        #[command(flatten)]
        fields: TransactionFields,
    },
    Update {
        customer: String,
        id: String,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        merchant: Option<String>,
        #[arg(long, conflicts_with = "expense")]
        income: bool,
        #[arg(long)]
        expense: bool,
        /// Remove the note
        #[arg(long, conflicts_with = "note")]
        clear_note: bool,
        #[command(flatten)]
        fields: TransactionFields,
    },
    Delete {
        customer: String,
        id: String,
    },
    List {
        customer: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum GoalCommand {
    Add {
        customer: String,
        name: String,
        target: Decimal,
        #[arg(long)]
        deadline: Option<NaiveDate>,
    },
    Contribute {
        customer: String,
        /// Goal id or name
        goal: String,
        amount: Decimal,
    },
    Withdraw {
        customer: String,
        /// Goal id or name
        goal: String,
        amount: Decimal,
    },
    List {
        customer: String,
    },
}

#[derive(Subcommand)]
enum ChallengeCommand {
    Add {
        customer: String,
        /// Category or merchant, e.g. "coffee", "category:dining", "merchant:Amazon"
        scope: String,
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long)]
        name: Option<String>,
        /// Start date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Savings hacks (repeatable)
        #[arg(long = "hack", value_parser = parse_hack)]
        hacks: Vec<Hack>,
    },
    Checkin {
        customer: String,
        /// Challenge id or name
        challenge: String,
        /// Day to check in for; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    List {
        customer: String,
    },
    Calendar {
        customer: String,
        /// Challenge id or name
        challenge: String,
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    Kpis {
        customer: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Category changes versus the previous month
    Mom {
        customer: String,
        /// Any date in the month to report on
        #[arg(long)]
        month: Option<NaiveDate>,
    },
    Recurring {
        customer: String,
    },
    Insights {
        customer: String,
    },
    Benchmark {
        customer: String,
        #[arg(long)]
        month: Option<NaiveDate>,
    },
    Tips {
        customer: String,
    },
    Reminders {
        customer: String,
    },
    /// Monthly reflection slides; defaults to last month
    Reflection {
        customer: String,
        #[arg(long)]
        month: Option<NaiveDate>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let cli = Cli::parse();

    let config = ResolvedConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;
    let storage = JsonFileStorage::new(&config.data_dir);
    let clock = SystemClock;

    match cli.command {
        Command::Config => print_json(&app::config_output(&cli.config, &config)),
        Command::Seed => print_json(&app::seed_demo_data(&storage, &config).await?),
        Command::Customer(cmd) => match cmd {
            CustomerCommand::Add { name, age, income } => {
                print_json(&app::add_customer(&storage, &name, age, income).await?)
            }
            CustomerCommand::List => print_json(&app::list_customers(&storage).await?),
            CustomerCommand::Remove { customer } => {
                print_json(&app::remove_customer(&storage, &customer).await?)
            }
        },
        Command::Transaction(cmd) => match cmd {
            TransactionCommand::Add {
                customer,
                amount,
                merchant,
                income,
                fields,
            } => {
                let args = NewTransactionArgs {
                    date: fields.date,
                    amount,
                    kind: if income {
                        TransactionKind::Income
                    } else {
                        TransactionKind::Expense
                    },
                    merchant,
                    category: fields.category,
                    note: fields.note,
                };
                print_json(&app::add_transaction(&storage, &config, &customer, args).await?)
            }
            TransactionCommand::Update {
                customer,
                id,
                amount,
                merchant,
                income,
                expense,
                clear_note,
                fields,
            } => {
                let kind = match (income, expense) {
                    (true, _) => Some(TransactionKind::Income),
                    (_, true) => Some(TransactionKind::Expense),
                    _ => None,
                };
                let note = if clear_note {
                    Some(None)
                } else {
                    fields.note.map(Some)
                };
                let patch = TransactionPatch {
                    date: fields.date,
                    amount,
                    kind,
                    raw_merchant: merchant,
                    category: fields.category,
                    note,
                };
                print_json(
                    &app::update_transaction(&storage, &config, &customer, &id, patch, &clock)
                        .await?,
                )
            }
            TransactionCommand::Delete { customer, id } => {
                print_json(&app::delete_transaction(&storage, &config, &customer, &id, &clock).await?)
            }
            TransactionCommand::List {
                customer,
                from,
                to,
                category,
                limit,
            } => {
                let filter = TransactionFilter {
                    from,
                    to,
                    category,
                    limit,
                };
                print_json(&app::list_transactions(&storage, &config, &customer, &filter).await?)
            }
        },
        Command::Goal(cmd) => match cmd {
            GoalCommand::Add {
                customer,
                name,
                target,
                deadline,
            } => print_json(
                &app::add_goal(&storage, &config, &customer, &name, target, deadline).await?,
            ),
            GoalCommand::Contribute {
                customer,
                goal,
                amount,
            } => print_json(
                &app::contribute_goal(&storage, &config, &customer, &goal, amount, &clock).await?,
            ),
            GoalCommand::Withdraw {
                customer,
                goal,
                amount,
            } => print_json(
                &app::withdraw_goal(&storage, &config, &customer, &goal, amount, &clock).await?,
            ),
            GoalCommand::List { customer } => {
                print_json(&app::list_goals(&storage, &config, &customer, &clock).await?)
            }
        },
        Command::Challenge(cmd) => match cmd {
            ChallengeCommand::Add {
                customer,
                scope,
                days,
                name,
                start,
                hacks,
            } => {
                let args = NewChallengeArgs {
                    name,
                    scope,
                    start_date: start,
                    duration_days: days,
                    hacks,
                };
                print_json(&app::add_challenge(&storage, &config, &customer, args).await?)
            }
            ChallengeCommand::Checkin {
                customer,
                challenge,
                date,
            } => print_json(
                &app::check_in_challenge(&storage, &config, &customer, &challenge, date, &clock)
                    .await?,
            ),
            ChallengeCommand::List { customer } => {
                print_json(&app::list_challenges(&storage, &config, &customer, &clock).await?)
            }
            ChallengeCommand::Calendar {
                customer,
                challenge,
                from,
                to,
            } => {
                let range = from.zip(to);
                print_json(
                    &app::challenge_calendar(
                        &storage, &config, &customer, &challenge, range, &clock,
                    )
                    .await?,
                )
            }
        },
        Command::Report(cmd) => match cmd {
            ReportCommand::Kpis { customer, from, to } => print_json(
                &app::kpis_report(&storage, &config, &customer, from, to, &clock).await?,
            ),
            ReportCommand::Mom { customer, month } => print_json(
                &app::month_over_month_report(&storage, &config, &customer, month, &clock).await?,
            ),
            ReportCommand::Recurring { customer } => {
                print_json(&app::recurring_report(&storage, &config, &customer, &clock).await?)
            }
            ReportCommand::Insights { customer } => {
                print_json(&app::insights_report(&storage, &config, &customer, &clock).await?)
            }
            ReportCommand::Benchmark { customer, month } => print_json(
                &app::benchmark_report(&storage, &config, &customer, month, &clock).await?,
            ),
            ReportCommand::Tips { customer } => {
                print_json(&app::tips_report(&storage, &config, &customer, &clock).await?)
            }
            ReportCommand::Reminders { customer } => {
                print_json(&app::reminders_report(&storage, &config, &customer, &clock).await?)
            }
            ReportCommand::Reflection { customer, month } => print_json(
                &app::reflection_report(&storage, &config, &customer, month, &clock).await?,
            ),
        },
        Command::Ask { customer, message } => {
            let message = message.join(" ");
            print_json(&app::ask(&storage, &config, &customer, &message, &clock).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn nested_subcommands_parse() {
        let cli = Cli::try_parse_from(["spendwise", "tx", "list", "maya", "--limit", "5"]).unwrap();
        match cli.command {
            Command::Transaction(TransactionCommand::List {
                customer, limit, ..
            }) => {
                assert_eq!(customer, "maya");
                assert_eq!(limit, Some(5));
            }
            _ => panic!("expected tx list"),
        }

        let cli = Cli::try_parse_from([
            "spendwise",
            "challenge",
            "add",
            "maya",
            "coffee",
            "--days",
            "14",
            "--hack",
            "roundups",
        ])
        .unwrap();
        match cli.command {
            Command::Challenge(ChallengeCommand::Add { days, hacks, .. }) => {
                assert_eq!(days, 14);
                assert_eq!(hacks, vec![Hack::Roundups]);
            }
            _ => panic!("expected challenge add"),
        }

        assert!(Cli::try_parse_from(["spendwise", "report"]).is_err());
    }
}
