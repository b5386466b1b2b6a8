//! Monthly reflection: a short, ordered set of story slides about one month.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::analytics::{month_end, month_start, previous_month_start};
use crate::context::CustomerContext;
use crate::format::format_percent;
use crate::goals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    TotalSpent,
    TopCategory,
    TopMerchant,
    BiggestPurchase,
    NoSpendDays,
    ChallengeSavings,
    GoalProgress,
    Closing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub kind: SlideKind,
    pub title: String,
    pub headline: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reflection {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub slides: Vec<Slide>,
}

/// Slides for the calendar month containing `month`. For the current month
/// the range stops at today.
pub fn reflection(ctx: &CustomerContext<'_>, month: NaiveDate) -> Reflection {
    let start = month_start(month);
    let end = month_end(month).min(ctx.today.max(start));
    let summary = ctx.kpis_between(start, end);
    let money = ctx.money;
    let month_name = start.format("%B").to_string();
    let mut slides = Vec::new();

    if summary.expenses > Decimal::ZERO {
        let previous = ctx.kpis_between(previous_month_start(start), start - Duration::days(1));
        let detail = if previous.expenses.is_zero() {
            format!("Across {} transactions.", summary.transaction_count)
        } else if summary.expenses <= previous.expenses {
            format!(
                "That's {} less than the month before.",
                money.format(previous.expenses - summary.expenses)
            )
        } else {
            format!(
                "That's {} more than the month before.",
                money.format(summary.expenses - previous.expenses)
            )
        };
        slides.push(Slide {
            kind: SlideKind::TotalSpent,
            title: format!("Your {}", start.format("%B %Y")),
            headline: money.format(summary.expenses),
            detail,
        });
    }

    if let Some(top) = summary.categories.first() {
        slides.push(Slide {
            kind: SlideKind::TopCategory,
            title: "Where it went".to_string(),
            headline: top.category.label().to_string(),
            detail: format!(
                "{}, {} of everything you spent.",
                money.format(top.amount),
                format_percent(top.share)
            ),
        });
    }

    if let Some(merchant) = summary.top_merchants.first() {
        let visits = if merchant.transaction_count == 1 {
            "1 visit".to_string()
        } else {
            format!("{} visits", merchant.transaction_count)
        };
        slides.push(Slide {
            kind: SlideKind::TopMerchant,
            title: "Your favorite spot".to_string(),
            headline: merchant.merchant.clone(),
            detail: format!("{visits}, {} in total.", money.format(merchant.amount)),
        });
    }

    if let Some(largest) = &summary.largest_expense {
        slides.push(Slide {
            kind: SlideKind::BiggestPurchase,
            title: "Biggest purchase".to_string(),
            headline: money.format(largest.amount),
            detail: format!("{} on {}.", largest.merchant, largest.date.format("%B %-d")),
        });
    }

    if summary.transaction_count > 0 && summary.no_spend_days > 0 {
        slides.push(Slide {
            kind: SlideKind::NoSpendDays,
            title: "No-spend days".to_string(),
            headline: format!("{} days", summary.no_spend_days),
            detail: format!(
                "You didn't spend a thing on {} days in {month_name}.",
                summary.no_spend_days
            ),
        });
    }

    let mut challenge_saved = Decimal::ZERO;
    let mut challenge_count = 0;
    let mut best_streak = 0;
    for challenge in ctx.challenges {
        let saved: Decimal = challenge
            .checkins
            .iter()
            .filter(|c| c.date >= start && c.date <= end)
            .map(|c| c.saved)
            .sum();
        if saved > Decimal::ZERO {
            challenge_saved += saved;
            challenge_count += 1;
            best_streak = best_streak.max(challenge.best_streak);
        }
    }
    if challenge_saved > Decimal::ZERO {
        let noun = if challenge_count == 1 {
            "challenge"
        } else {
            "challenges"
        };
        slides.push(Slide {
            kind: SlideKind::ChallengeSavings,
            title: "Challenge savings".to_string(),
            headline: money.format(challenge_saved),
            detail: format!(
                "Saved through {challenge_count} {noun}, with a best streak of {best_streak} days."
            ),
        });
    }

    let added: Decimal = ctx
        .goals
        .iter()
        .flat_map(|g| g.contributions.iter())
        .filter(|c| c.date >= start && c.date <= end)
        .map(|c| c.amount)
        .sum();
    let leading = ctx
        .goals
        .iter()
        .map(|g| (g, goals::progress(g, ctx.today)))
        .max_by(|a, b| a.1.percent.cmp(&b.1.percent));
    if let Some((goal, progress)) = leading {
        if !added.is_zero() || progress.percent > 0 {
            let detail = if progress.complete {
                format!("{} is fully funded.", goal.name)
            } else {
                format!("{} is {}% of the way there.", goal.name, progress.percent)
            };
            slides.push(Slide {
                kind: SlideKind::GoalProgress,
                title: format!("Added to goals in {month_name}"),
                headline: money.format(added),
                detail,
            });
        }
    }

    let next_focus = summary
        .categories
        .iter()
        .find(|c| c.category.is_discretionary());
    let detail = match next_focus {
        Some(focus) => {
            let days = Decimal::from((end - start).num_days() + 1);
            format!(
                "Next month, try one week without {}. It could keep about {} in your pocket.",
                focus.category.label().to_lowercase(),
                money.format(focus.amount * Decimal::from(7) / days)
            )
        }
        None => "Keep the momentum going next month.".to_string(),
    };
    slides.push(Slide {
        kind: SlideKind::Closing,
        title: "Up next".to_string(),
        headline: format!("That's a wrap on {month_name}"),
        detail,
    });

    Reflection {
        month_start: start,
        month_end: end,
        slides,
    }
}
