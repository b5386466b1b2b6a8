use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Category, Transaction};

use super::{is_spending, month_end, month_start, previous_month_start};

const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: Decimal,
    pub transaction_count: usize,
    /// Percent of total spending, one decimal place.
    pub share: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantTotal {
    pub merchant: String,
    pub amount: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargestExpense {
    pub date: NaiveDate,
    pub merchant: String,
    pub category: Category,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    /// Net as a percent of income; absent when there was no income.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_rate: Option<Decimal>,
    pub avg_daily_spend: Decimal,
    pub transaction_count: usize,
    pub no_spend_days: u32,
    pub categories: Vec<CategoryShare>,
    pub top_merchants: Vec<MerchantTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_expense: Option<LargestExpense>,
}

pub fn kpis(transactions: &[Transaction], start: NaiveDate, end: NaiveDate) -> Kpis {
    kpis_with_top(transactions, start, end, DEFAULT_TOP_N)
}

/// KPIs for `[start, end]`, keeping `top_n` merchants.
pub fn kpis_with_top(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
    top_n: usize,
) -> Kpis {
    let in_range: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.date >= start && t.date <= end)
        .collect();

    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    let mut by_category: HashMap<Category, (Decimal, usize)> = HashMap::new();
    let mut by_merchant: HashMap<String, (String, Decimal, usize)> = HashMap::new();
    let mut spend_days: HashSet<NaiveDate> = HashSet::new();
    let mut largest: Option<&Transaction> = None;

    for &tx in &in_range {
        if tx.is_income() {
            income += tx.amount;
            continue;
        }
        if !is_spending(tx) {
            continue;
        }
        expenses += tx.amount;
        spend_days.insert(tx.date);

        let entry = by_category.entry(tx.category).or_insert((Decimal::ZERO, 0));
        entry.0 += tx.amount;
        entry.1 += 1;

        let entry = by_merchant
            .entry(tx.merchant.to_lowercase())
            .or_insert_with(|| (tx.merchant.clone(), Decimal::ZERO, 0));
        entry.1 += tx.amount;
        entry.2 += 1;

        largest = match largest {
            Some(current) if current.amount >= tx.amount => Some(current),
            _ => Some(tx),
        };
    }

    let days = if end >= start {
        (end - start).num_days() + 1
    } else {
        0
    };
    let avg_daily_spend = if days > 0 {
        (expenses / Decimal::from(days)).round_dp(2)
    } else {
        Decimal::ZERO
    };
    let no_spend_days = (days as usize).saturating_sub(spend_days.len()) as u32;

    let mut categories: Vec<CategoryShare> = by_category
        .into_iter()
        .map(|(category, (amount, transaction_count))| CategoryShare {
            category,
            amount,
            transaction_count,
            share: percent_of(amount, expenses),
        })
        .collect();
    categories.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.category.cmp(&b.category)));

    let mut top_merchants: Vec<MerchantTotal> = by_merchant
        .into_values()
        .map(|(merchant, amount, transaction_count)| MerchantTotal {
            merchant,
            amount,
            transaction_count,
        })
        .collect();
    top_merchants.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.merchant.cmp(&b.merchant)));
    top_merchants.truncate(top_n);

    let net = income - expenses;
    let savings_rate = (income > Decimal::ZERO).then(|| percent_of(net, income));

    Kpis {
        start,
        end,
        income,
        expenses,
        net,
        savings_rate,
        avg_daily_spend,
        transaction_count: in_range.len(),
        no_spend_days,
        categories,
        top_merchants,
        largest_expense: largest.map(|t| LargestExpense {
            date: t.date,
            merchant: t.merchant.clone(),
            category: t.category,
            amount: t.amount,
        }),
    }
}

pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole).round_dp(1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryChange {
    pub category: Category,
    pub current: Decimal,
    pub previous: Decimal,
    pub change: Decimal,
    /// Absent when nothing was spent in the previous month.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Decimal>,
}

/// Per-category spend in the calendar month containing `month` versus the
/// month before, largest movement first.
pub fn month_over_month(transactions: &[Transaction], month: NaiveDate) -> Vec<CategoryChange> {
    let current_start = month_start(month);
    let current_end = month_end(month);
    let previous_start = previous_month_start(month);
    let previous_end = current_start - Duration::days(1);

    let mut totals: HashMap<Category, (Decimal, Decimal)> = HashMap::new();
    for tx in transactions.iter().filter(|t| is_spending(t)) {
        if tx.date >= current_start && tx.date <= current_end {
            totals.entry(tx.category).or_default().0 += tx.amount;
        } else if tx.date >= previous_start && tx.date <= previous_end {
            totals.entry(tx.category).or_default().1 += tx.amount;
        }
    }

    let mut changes: Vec<CategoryChange> = totals
        .into_iter()
        .map(|(category, (current, previous))| CategoryChange {
            category,
            current,
            previous,
            change: current - previous,
            change_percent: (!previous.is_zero())
                .then(|| percent_of(current - previous, previous)),
        })
        .collect();
    changes.sort_by(|a, b| {
        b.change
            .abs()
            .cmp(&a.change.abs())
            .then(a.category.cmp(&b.category))
    });
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn dollars(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn april() -> Vec<Transaction> {
        vec![
            Transaction::income(day(1), dollars(400000), "ACME PAYROLL"),
            Transaction::expense(day(2), dollars(1200), "Chipotle"),
            Transaction::expense(day(2), dollars(550), "Starbucks"),
            Transaction::expense(day(5), dollars(8800), "Whole Foods"),
            Transaction::expense(day(6), dollars(750), "Starbucks"),
            Transaction::expense(day(7), dollars(20000), "Venmo"),
        ]
    }

    #[test]
    fn kpis_totals_and_rates() {
        let k = kpis(&april(), day(1), day(10));
        assert_eq!(k.income, dollars(400000));
        assert_eq!(k.expenses, dollars(11300));
        assert_eq!(k.net, dollars(388700));
        assert_eq!(k.savings_rate, Some(Decimal::new(972, 1)));
        assert_eq!(k.avg_daily_spend, dollars(1130));
        assert_eq!(k.transaction_count, 6);
        // Spending on the 2nd, 5th and 6th; the Venmo transfer does not count.
        assert_eq!(k.no_spend_days, 7);
    }

    #[test]
    fn kpis_breakdowns_are_sorted() {
        let k = kpis(&april(), day(1), day(10));
        let cats: Vec<Category> = k.categories.iter().map(|c| c.category).collect();
        assert_eq!(cats, vec![Category::Groceries, Category::Coffee, Category::Dining]);
        assert_eq!(k.categories[0].share, Decimal::new(779, 1));
        assert_eq!(k.categories[1].transaction_count, 2);

        assert_eq!(k.top_merchants[0].merchant, "Whole Foods");
        assert_eq!(k.top_merchants[1].merchant, "Starbucks");
        assert_eq!(k.top_merchants[1].amount, dollars(1300));
        assert_eq!(k.top_merchants[2].merchant, "Chipotle");

        let largest = k.largest_expense.unwrap();
        assert_eq!(largest.merchant, "Whole Foods");
        assert_eq!(largest.date, day(5));
    }

    #[test]
    fn kpis_without_income_has_no_savings_rate() {
        let txns = vec![Transaction::expense(day(3), dollars(500), "Lyft")];
        let k = kpis(&txns, day(1), day(5));
        assert_eq!(k.savings_rate, None);
        assert_eq!(k.net, dollars(-500));
    }

    #[test]
    fn kpis_empty_range() {
        let k = kpis(&april(), day(20), day(19));
        assert_eq!(k.transaction_count, 0);
        assert_eq!(k.avg_daily_spend, Decimal::ZERO);
        assert_eq!(k.no_spend_days, 0);
        assert!(k.largest_expense.is_none());
    }

    #[test]
    fn month_over_month_compares_calendar_months() {
        let may = |d| NaiveDate::from_ymd_opt(2026, 5, d).unwrap();
        let mut txns = april();
        txns.push(Transaction::expense(may(3), dollars(2400), "Chipotle"));
        txns.push(Transaction::expense(may(4), dollars(1000), "Lyft"));

        let changes = month_over_month(&txns, may(15));
        let dining = changes.iter().find(|c| c.category == Category::Dining).unwrap();
        assert_eq!(dining.previous, dollars(1200));
        assert_eq!(dining.current, dollars(2400));
        assert_eq!(dining.change_percent, Some(Decimal::new(1000, 1)));

        let transport = changes.iter().find(|c| c.category == Category::Transport).unwrap();
        assert_eq!(transport.change_percent, None);

        // Groceries dropped by the most.
        assert_eq!(changes[0].category, Category::Groceries);
        assert_eq!(changes[0].change, dollars(-8800));
    }
}
