//! Chat replies driven by keyword intents, plus nudges after new expenses.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::analytics::{is_spending, month_end, month_start, previous_month_start};
use crate::challenges::{self, ChallengeSettings, ChallengeStatus};
use crate::context::CustomerContext;
use crate::format::MoneyFormat;
use crate::goals;
use crate::merchants::{category_for_keyword, known_merchant};
use crate::models::{Challenge, ChallengeScope, Hack, Transaction};
use crate::tips::{self, Priority};

const MAX_NUDGES: usize = 2;
const MAX_TIPS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SpendQuery,
    Affordability,
    GoalStatus,
    ChallengeStatus,
    Subscriptions,
    Tips,
    Help,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub intent: Intent,
    pub text: String,
    pub nudges: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Today,
    Week,
    Month,
    LastMonth,
}

impl Period {
    fn range(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Today => (today, today),
            Period::Week => (today - Duration::days(6), today),
            Period::Month => (month_start(today), today),
            Period::LastMonth => {
                let start = previous_month_start(today);
                (start, month_end(start))
            }
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "in the last 7 days",
            Period::Month => "so far this month",
            Period::LastMonth => "last month",
        }
    }
}

/// Compiled intent patterns.
pub struct Assistant {
    affordability: Regex,
    amount: Regex,
    spend: Regex,
    target: Regex,
    period: Regex,
    subscriptions: Regex,
    challenge: Regex,
    goal: Regex,
    tips: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Invalid intent pattern: {pattern}"))
}

impl Assistant {
    pub fn new() -> Result<Self> {
        Ok(Self {
            affordability: compile(r"\b(?:can|could|should) i (?:afford|buy|spend|get)\b")?,
            amount: compile(r"\$?(\d+(?:,\d{3})*(?:\.\d{1,2})?)")?,
            spend: compile(r"\b(?:spen[dt]|spending|paid|pay)\b")?,
            target: compile(
                r"\b(?:on|at|for)\s+([a-z0-9][a-z0-9 '&.+-]*?)\s*(?:\b(?:today|this|last|in|during)\b|[?.!]|$)",
            )?,
            period: compile(r"\b(today|this week|last week|week|last month|this month|month)\b")?,
            subscriptions: compile(r"\b(?:subscriptions?|recurring|memberships?)\b")?,
            challenge: compile(r"\b(?:challenges?|streaks?|check[- ]?in)\b")?,
            goal: compile(r"\b(?:goals?|saving for|savings target)\b")?,
            tips: compile(r"\b(?:tips?|advice|suggest\w*|save more|how (?:can|do) i save)\b")?,
        })
    }

    pub fn respond(&self, message: &str, ctx: &CustomerContext<'_>) -> AssistantReply {
        let text = message.trim().to_lowercase();
        let (intent, reply) = if let Some(found) = self.affordability.find(&text) {
            let amount = self
                .amount
                .captures(&text[found.end()..])
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().replace(',', "").parse::<Decimal>().ok());
            (Intent::Affordability, affordability(amount, ctx))
        } else if self.spend.is_match(&text) {
            (Intent::SpendQuery, self.spend_query(&text, ctx))
        } else if self.subscriptions.is_match(&text) {
            (Intent::Subscriptions, subscriptions(ctx))
        } else if self.challenge.is_match(&text) {
            (Intent::ChallengeStatus, challenge_status(ctx))
        } else if self.goal.is_match(&text) {
            (Intent::GoalStatus, goal_status(ctx))
        } else if self.tips.is_match(&text) {
            (Intent::Tips, tip_list(ctx))
        } else {
            (Intent::Help, help())
        };
        tracing::debug!(?intent, "Assistant matched intent");

        let nudges = tips::reminders(ctx)
            .into_iter()
            .filter(|r| r.priority != Priority::Low)
            .take(MAX_NUDGES)
            .map(|r| r.message)
            .collect();

        AssistantReply {
            intent,
            text: reply,
            nudges,
        }
    }

    fn spend_query(&self, text: &str, ctx: &CustomerContext<'_>) -> String {
        let period = match self.period.captures(text).and_then(|c| c.get(1)) {
            Some(m) => match m.as_str() {
                "today" => Period::Today,
                "this week" | "week" | "last week" => Period::Week,
                "last month" => Period::LastMonth,
                _ => Period::Month,
            },
            None => Period::Month,
        };
        let (start, end) = period.range(ctx.today);

        let target = self
            .target
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty());
        let scope = target.as_deref().and_then(|t| {
            category_for_keyword(t)
                .map(ChallengeScope::Category)
                .or_else(|| known_merchant(t).map(|name| ChallengeScope::Merchant(name.to_string())))
        });

        let in_range = ctx
            .transactions
            .iter()
            .filter(|t| t.date >= start && t.date <= end);
        let money = ctx.money;
        match (&scope, target) {
            (Some(scope), _) => {
                let matching: Vec<&Transaction> =
                    in_range.filter(|t| scope.is_violated_by(t)).collect();
                let total: Decimal = matching.iter().map(|t| t.amount).sum();
                let count = match matching.len() {
                    1 => "1 transaction".to_string(),
                    n => format!("{n} transactions"),
                };
                format!(
                    "You spent {} on {} {} ({count}).",
                    money.format(total),
                    scope.label(),
                    period.phrase()
                )
            }
            (None, Some(target)) => format!(
                "I couldn't match \"{target}\" to a merchant or category. Try a category like \
                 dining, coffee or groceries."
            ),
            (None, None) => {
                let total: Decimal = in_range
                    .filter(|t| is_spending(t))
                    .map(|t| t.amount)
                    .sum();
                format!("You spent {} {}.", money.format(total), period.phrase())
            }
        }
    }
}

/// Convenience wrapper that compiles the patterns for a single reply.
pub fn respond(message: &str, ctx: &CustomerContext<'_>) -> Result<AssistantReply> {
    Ok(Assistant::new()?.respond(message, ctx))
}

/// Money left this month after spending, upcoming recurring charges and
/// goal commitments.
fn affordability(amount: Option<Decimal>, ctx: &CustomerContext<'_>) -> String {
    let money = ctx.money;
    let Some(amount) = amount else {
        return "How much is it? Ask something like \"can I afford $120?\"".to_string();
    };

    let start = month_start(ctx.today);
    let end = month_end(ctx.today);
    let month = ctx.kpis_between(start, ctx.today);
    let income = month.income.max(ctx.profile.monthly_income);
    if income.is_zero() {
        return "I don't know your income yet. Add a paycheck or set a monthly income first."
            .to_string();
    }

    let upcoming: Decimal = ctx
        .recurring()
        .iter()
        .filter(|r| r.active && r.next_expected > ctx.today && r.next_expected <= end)
        .map(|r| r.typical_amount)
        .sum();
    let committed: Decimal = ctx
        .goals
        .iter()
        .filter_map(|g| goals::progress(g, ctx.today).required_monthly)
        .sum();
    let available = income - month.expenses - upcoming - committed;

    if amount <= available / Decimal::TWO {
        format!(
            "Yes. After {} you'd still have about {} left this month.",
            money.format(amount),
            money.format(available - amount)
        )
    } else if amount <= available {
        format!(
            "You can, but {} would use most of the {} you have left this month after bills and goals.",
            money.format(amount),
            money.format(available)
        )
    } else {
        format!(
            "Not comfortably. You have about {} left this month after upcoming bills and goal \
             savings, so {} would put you {} over.",
            money.format(available.max(Decimal::ZERO)),
            money.format(amount),
            money.format(amount - available.max(Decimal::ZERO))
        )
    }
}

fn subscriptions(ctx: &CustomerContext<'_>) -> String {
    let subs: Vec<_> = ctx
        .recurring()
        .into_iter()
        .filter(|r| r.active && r.is_subscription)
        .collect();
    if subs.is_empty() {
        return "I don't see any active subscriptions in your recent transactions.".to_string();
    }
    let total: Decimal = subs.iter().map(|r| r.monthly_cost).sum();
    let names: Vec<String> = subs
        .iter()
        .map(|r| format!("{} ({})", r.merchant, ctx.money.format(r.monthly_cost)))
        .collect();
    format!(
        "You have {} active subscriptions costing {} a month: {}.",
        subs.len(),
        ctx.money.format(total),
        names.join(", ")
    )
}

fn challenge_status(ctx: &CustomerContext<'_>) -> String {
    let lines: Vec<String> = ctx
        .challenges
        .iter()
        .filter_map(|c| {
            let p = challenges::progress(c, ctx.today);
            (p.status == ChallengeStatus::Active).then(|| {
                let day = (ctx.today - c.start_date).num_days() + 1;
                format!(
                    "{}: day {} of {}, {}-day streak, {} saved",
                    c.name,
                    day,
                    c.duration_days,
                    p.current_streak,
                    ctx.money.format(p.total_saved)
                )
            })
        })
        .collect();
    if lines.is_empty() {
        "You don't have an active challenge. Start one to turn a habit into savings.".to_string()
    } else {
        format!("{}.", lines.join("; "))
    }
}

fn goal_status(ctx: &CustomerContext<'_>) -> String {
    if ctx.goals.is_empty() {
        return "You don't have any savings goals yet.".to_string();
    }
    let lines: Vec<String> = ctx
        .goals
        .iter()
        .map(|g| {
            let p = goals::progress(g, ctx.today);
            let status = if p.complete {
                "done".to_string()
            } else if g.deadline.is_none() {
                format!("{} to go", ctx.money.format(p.remaining))
            } else if p.on_track {
                "on track".to_string()
            } else {
                format!(
                    "behind, needs {} a month",
                    ctx.money.format(p.required_monthly.unwrap_or(p.remaining))
                )
            };
            format!(
                "{}: {} of {} ({}%, {status})",
                g.name,
                ctx.money.format(g.saved),
                ctx.money.format(g.target),
                p.percent
            )
        })
        .collect();
    format!("{}.", lines.join("; "))
}

fn tip_list(ctx: &CustomerContext<'_>) -> String {
    let list = tips::tips(ctx);
    if list.is_empty() {
        return "Nothing stands out right now. Keep doing what you're doing.".to_string();
    }
    list.iter()
        .take(MAX_TIPS)
        .map(|t| t.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn help() -> String {
    "I can answer things like \"how much did I spend on coffee this week?\", \
     \"can I afford $200?\", \"how are my goals?\", \"how's my challenge going?\", \
     \"what subscriptions do I have?\" or \"any tips?\""
        .to_string()
}

/// Messages for each active challenge that `tx` breaks.
pub fn nudges_after_transaction(
    tx: &Transaction,
    challenges: &[Challenge],
    settings: &ChallengeSettings,
    money: &MoneyFormat,
) -> Vec<String> {
    challenges
        .iter()
        .filter(|c| c.contains(tx.date) && c.scope.is_violated_by(tx))
        .map(|c| {
            let mut text = format!(
                "That {} purchase breaks your \"{}\" challenge for {}. \
                 Your streak resets, but tomorrow is a fresh start.",
                tx.merchant,
                c.name,
                tx.date.format("%b %-d")
            );
            if c.has_hack(Hack::SwearJar) {
                text.push_str(&format!(
                    " {} goes into the swear jar.",
                    money.format(settings.swear_jar_penalty)
                ));
            }
            text
        })
        .collect()
}
