//! Peer spending benchmarks by age band.
//!
//! Figures are monthly spend in whole currency units at the 10th, 25th,
//! 50th, 75th and 90th percentiles of each cohort.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::analytics::{kpis, month_end, month_start};
use crate::format::MoneyFormat;
use crate::models::{AgeBand, Category, CustomerProfile, Transaction};

const PERCENTILES: [u32; 5] = [10, 25, 50, 75, 90];

/// `None` in the category column is total monthly spend.
const TABLE: &[(AgeBand, Option<Category>, [u32; 5])] = &[
    (AgeBand::Age18To24, Some(Category::Groceries), [100, 145, 200, 265, 340]),
    (AgeBand::Age18To24, Some(Category::Dining), [50, 100, 185, 290, 425]),
    (AgeBand::Age18To24, Some(Category::Coffee), [10, 30, 55, 95, 145]),
    (AgeBand::Age18To24, Some(Category::Transport), [40, 85, 140, 225, 320]),
    (AgeBand::Age18To24, Some(Category::Shopping), [50, 100, 175, 280, 435]),
    (AgeBand::Age18To24, Some(Category::Entertainment), [15, 30, 65, 105, 170]),
    (AgeBand::Age18To24, Some(Category::Subscriptions), [10, 20, 40, 60, 90]),
    (AgeBand::Age18To24, None, [980, 1470, 2030, 2730, 3640]),
    (AgeBand::Age25To34, Some(Category::Groceries), [180, 260, 360, 480, 620]),
    (AgeBand::Age25To34, Some(Category::Dining), [60, 120, 220, 340, 500]),
    (AgeBand::Age25To34, Some(Category::Coffee), [10, 25, 50, 85, 130]),
    (AgeBand::Age25To34, Some(Category::Transport), [60, 120, 200, 320, 460]),
    (AgeBand::Age25To34, Some(Category::Shopping), [70, 140, 250, 400, 620]),
    (AgeBand::Age25To34, Some(Category::Entertainment), [20, 45, 90, 150, 240]),
    (AgeBand::Age25To34, Some(Category::Subscriptions), [15, 30, 55, 85, 125]),
    (AgeBand::Age25To34, None, [1400, 2100, 2900, 3900, 5200]),
    (AgeBand::Age35To44, Some(Category::Groceries), [245, 350, 485, 650, 835]),
    (AgeBand::Age35To44, Some(Category::Dining), [70, 145, 265, 410, 600]),
    (AgeBand::Age35To44, Some(Category::Coffee), [10, 20, 45, 75, 115]),
    (AgeBand::Age35To44, Some(Category::Transport), [70, 145, 240, 385, 550]),
    (AgeBand::Age35To44, Some(Category::Shopping), [85, 170, 300, 480, 745]),
    (AgeBand::Age35To44, Some(Category::Entertainment), [25, 55, 110, 180, 290]),
    (AgeBand::Age35To44, Some(Category::Subscriptions), [20, 35, 65, 100, 150]),
    (AgeBand::Age35To44, None, [1680, 2520, 3480, 4680, 6240]),
    (AgeBand::Age45To54, Some(Category::Groceries), [235, 340, 470, 625, 805]),
    (AgeBand::Age45To54, Some(Category::Dining), [70, 145, 265, 410, 600]),
    (AgeBand::Age45To54, Some(Category::Coffee), [10, 20, 40, 70, 105]),
    (AgeBand::Age45To54, Some(Category::Transport), [70, 145, 240, 385, 550]),
    (AgeBand::Age45To54, Some(Category::Shopping), [85, 170, 300, 480, 745]),
    (AgeBand::Age45To54, Some(Category::Entertainment), [20, 50, 100, 165, 265]),
    (AgeBand::Age45To54, Some(Category::Subscriptions), [20, 35, 65, 100, 150]),
    (AgeBand::Age45To54, None, [1680, 2520, 3480, 4680, 6240]),
    (AgeBand::Age55To64, Some(Category::Groceries), [190, 275, 380, 505, 650]),
    (AgeBand::Age55To64, Some(Category::Dining), [55, 115, 210, 325, 475]),
    (AgeBand::Age55To64, Some(Category::Coffee), [5, 20, 35, 60, 90]),
    (AgeBand::Age55To64, Some(Category::Transport), [65, 125, 210, 335, 485]),
    (AgeBand::Age55To64, Some(Category::Shopping), [75, 145, 260, 420, 650]),
    (AgeBand::Age55To64, Some(Category::Entertainment), [20, 45, 95, 160, 250]),
    (AgeBand::Age55To64, Some(Category::Subscriptions), [15, 25, 50, 75, 110]),
    (AgeBand::Age55To64, None, [1470, 2205, 3045, 4095, 5460]),
    (AgeBand::Age65Plus, Some(Category::Groceries), [155, 220, 305, 410, 525]),
    (AgeBand::Age65Plus, Some(Category::Dining), [50, 100, 185, 290, 425]),
    (AgeBand::Age65Plus, Some(Category::Coffee), [5, 15, 30, 45, 70]),
    (AgeBand::Age65Plus, Some(Category::Transport), [40, 85, 140, 225, 320]),
    (AgeBand::Age65Plus, Some(Category::Shopping), [50, 105, 190, 300, 465]),
    (AgeBand::Age65Plus, Some(Category::Entertainment), [15, 40, 75, 130, 205]),
    (AgeBand::Age65Plus, Some(Category::Subscriptions), [10, 20, 40, 65, 95]),
    (AgeBand::Age65Plus, None, [1190, 1785, 2465, 3315, 4420]),
];

/// Percentile points for a cohort and category, if benchmarked.
pub fn benchmark_for(band: AgeBand, category: Option<Category>) -> Option<[u32; 5]> {
    TABLE
        .iter()
        .find(|(b, c, _)| *b == band && *c == category)
        .map(|(_, _, points)| *points)
}

/// Where `amount` falls among peers (percent of peers spending less), or
/// `None` when the category has no benchmark.
///
/// Interpolates linearly between the known points, extends the outer
/// segments past p10 and p90, and clamps the result to 1..=99.
pub fn percentile_for(band: AgeBand, category: Option<Category>, amount: Decimal) -> Option<u32> {
    let points = benchmark_for(band, category)?;
    Some(interpolate(&points, amount))
}

fn interpolate(points: &[u32; 5], amount: Decimal) -> u32 {
    let last = points.len() - 1;
    let segment = points
        .windows(2)
        .position(|w| amount <= Decimal::from(w[1]))
        .unwrap_or(last - 1);

    let (v0, v1) = (Decimal::from(points[segment]), Decimal::from(points[segment + 1]));
    let (p0, p1) = (
        Decimal::from(PERCENTILES[segment]),
        Decimal::from(PERCENTILES[segment + 1]),
    );
    let pct = if v1 == v0 {
        p1
    } else {
        p0 + (amount - v0) * (p1 - p0) / (v1 - v0)
    };

    let rounded = pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let clamped = rounded.max(Decimal::ONE).min(Decimal::from(99));
    clamped.to_u32().unwrap_or(50)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Below,
    Typical,
    Above,
}

impl Position {
    fn for_percentile(pct: u32) -> Self {
        match pct {
            0..=39 => Position::Below,
            40..=60 => Position::Typical,
            _ => Position::Above,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRow {
    /// Absent for the total-spend row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub label: String,
    pub amount: Decimal,
    pub peer_median: Decimal,
    pub percentile: u32,
    pub position: Position,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub age_band: AgeBand,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub rows: Vec<BenchmarkRow>,
}

/// Compare a customer's spend in the calendar month containing `month`
/// with their age cohort. The total row comes first, then each category
/// in table order.
pub fn compare(
    profile: &CustomerProfile,
    transactions: &[Transaction],
    month: NaiveDate,
    money: &MoneyFormat,
) -> BenchmarkReport {
    let band = profile.age_band();
    let start = month_start(month);
    let end = month_end(month);
    let summary = kpis(transactions, start, end);

    let mut rows: Vec<BenchmarkRow> = TABLE
        .iter()
        .filter(|(b, _, _)| *b == band)
        .map(|(_, category, points)| {
            let amount = match category {
                None => summary.expenses,
                Some(c) => summary
                    .categories
                    .iter()
                    .find(|s| s.category == *c)
                    .map(|s| s.amount)
                    .unwrap_or(Decimal::ZERO),
            };
            let label = category.map_or("Total spending", |c| c.label()).to_string();
            let percentile = interpolate(points, amount);
            let position = Position::for_percentile(percentile);
            let peer_median = Decimal::from(points[2]);
            let message = describe(&label, amount, peer_median, percentile, position, band, money);
            BenchmarkRow {
                category: *category,
                label,
                amount,
                peer_median,
                percentile,
                position,
                message,
            }
        })
        .collect();
    rows.sort_by_key(|row| row.category.is_some());

    BenchmarkReport {
        age_band: band,
        month_start: start,
        month_end: end,
        rows,
    }
}

fn describe(
    label: &str,
    amount: Decimal,
    peer_median: Decimal,
    percentile: u32,
    position: Position,
    band: AgeBand,
    money: &MoneyFormat,
) -> String {
    let spent = money.format(amount);
    let typical = money.format_whole(peer_median);
    let cohort = band.label();
    match position {
        Position::Below => format!(
            "{label}: {spent}, less than about {}% of people aged {cohort} (typical: {typical}).",
            100 - percentile
        ),
        Position::Typical => {
            format!("{label}: {spent}, about typical for people aged {cohort} (typical: {typical}).")
        }
        Position::Above => format!(
            "{label}: {spent}, more than about {percentile}% of people aged {cohort} (typical: {typical})."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(category: Option<Category>, amount: i64) -> Option<u32> {
        percentile_for(AgeBand::Age25To34, category, Decimal::from(amount))
    }

    #[test]
    fn every_band_has_total_and_core_categories() {
        let bands = [
            AgeBand::Age18To24,
            AgeBand::Age25To34,
            AgeBand::Age35To44,
            AgeBand::Age45To54,
            AgeBand::Age55To64,
            AgeBand::Age65Plus,
        ];
        for band in bands {
            assert!(benchmark_for(band, None).is_some());
            assert!(benchmark_for(band, Some(Category::Dining)).is_some());
            let points = benchmark_for(band, Some(Category::Groceries)).unwrap();
            assert!(points.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn percentile_interpolates_between_points() {
        assert_eq!(pct(Some(Category::Coffee), 50), Some(50));
        // Halfway plus between p50 (50) and p75 (85).
        assert_eq!(
            percentile_for(AgeBand::Age25To34, Some(Category::Coffee), Decimal::new(675, 1)),
            Some(63)
        );
        assert_eq!(pct(None, 3400), Some(63));
    }

    #[test]
    fn percentile_clamps_at_extremes() {
        assert_eq!(pct(Some(Category::Coffee), 0), Some(1));
        assert_eq!(pct(Some(Category::Coffee), 10_000), Some(99));
    }

    #[test]
    fn unbenchmarked_category_has_no_percentile() {
        assert_eq!(pct(Some(Category::Bills), 100), None);
    }

    #[test]
    fn compare_builds_rows_with_text() {
        let profile = CustomerProfile::new("Maya", 29);
        let june = |d| NaiveDate::from_ymd_opt(2026, 6, d).unwrap();
        let txns = vec![
            Transaction::expense(june(2), Decimal::from(130), "Starbucks"),
            Transaction::expense(june(3), Decimal::from(60), "Chipotle"),
            // Outside the month.
            Transaction::expense(
                NaiveDate::from_ymd_opt(2026, 5, 30).unwrap(),
                Decimal::from(900),
                "Chipotle",
            ),
        ];
        let report = compare(&profile, &txns, june(15), &MoneyFormat::default());

        assert_eq!(report.age_band, AgeBand::Age25To34);
        assert_eq!(report.rows.len(), 8);
        assert_eq!(report.rows[0].category, None);
        assert_eq!(report.rows[0].amount, Decimal::from(190));
        assert!(report.rows[1..].iter().all(|r| r.category.is_some()));

        let coffee = report
            .rows
            .iter()
            .find(|r| r.category == Some(Category::Coffee))
            .unwrap();
        assert_eq!(coffee.percentile, 90);
        assert_eq!(coffee.position, Position::Above);
        assert_eq!(
            coffee.message,
            "Coffee: $130.00, more than about 90% of people aged 25-34 (typical: $50)."
        );

        let dining = report
            .rows
            .iter()
            .find(|r| r.category == Some(Category::Dining))
            .unwrap();
        assert_eq!(dining.position, Position::Below);
        assert_eq!(dining.percentile, 10);
        assert!(dining.message.contains("less than about 90% of people"));
    }
}
