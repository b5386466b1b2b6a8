use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Category, Id, Transaction};

/// Longest challenge window accepted.
pub const MAX_DURATION_DAYS: u32 = 365;

/// What a challenge forbids spending on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ChallengeScope {
    Category(Category),
    Merchant(String),
}

impl ChallengeScope {
    /// True when `tx` is an expense that falls inside this scope.
    pub fn is_violated_by(&self, tx: &Transaction) -> bool {
        if !tx.is_expense() {
            return false;
        }
        match self {
            ChallengeScope::Category(category) => tx.category == *category,
            ChallengeScope::Merchant(name) => {
                let needle = name.trim().to_lowercase();
                if needle.is_empty() {
                    return false;
                }
                tx.merchant.to_lowercase() == needle
                    || tx.raw_merchant.to_lowercase().contains(&needle)
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            ChallengeScope::Category(category) => category.label().to_string(),
            ChallengeScope::Merchant(name) => name.clone(),
        }
    }
}

/// Savings modifiers layered on top of a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hack {
    /// Round every expense of the day up to the next whole unit and save the change.
    Roundups,
    /// Save an extra percentage of the estimated daily saving on successful days.
    SmartSave,
    /// Pay a fixed penalty into savings on a missed day.
    SwearJar,
    /// Move a fixed amount every day of the challenge regardless of outcome.
    SetForget,
}

impl Hack {
    pub fn as_str(self) -> &'static str {
        match self {
            Hack::Roundups => "roundups",
            Hack::SmartSave => "smart_save",
            Hack::SwearJar => "swear_jar",
            Hack::SetForget => "set_forget",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "roundups" | "round_ups" => Some(Hack::Roundups),
            "smart_save" | "smartsave" => Some(Hack::SmartSave),
            "swear_jar" | "swearjar" => Some(Hack::SwearJar),
            "set_forget" | "set_and_forget" => Some(Hack::SetForget),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    Done,
    Missed,
}

/// Outcome recorded for one day of a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub date: NaiveDate,
    pub status: CheckInStatus,
    #[serde(default)]
    pub saved: Decimal,
    #[serde(default)]
    pub penalty: Decimal,
    /// True when recorded by the auto check-in rather than the user.
    #[serde(default)]
    pub auto: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Id,
    pub name: String,
    pub scope: ChallengeScope,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub estimated_daily_saving: Decimal,
    #[serde(default)]
    pub hacks: Vec<Hack>,
    #[serde(default)]
    pub checkins: Vec<CheckIn>,
    #[serde(default)]
    pub best_streak: u32,
}

impl Challenge {
    /// Window length in days, clamped to `1..=MAX_DURATION_DAYS`.
    pub fn window_days(&self) -> u32 {
        self.duration_days.clamp(1, MAX_DURATION_DAYS)
    }

    /// Last day inside the window (inclusive).
    pub fn end_date(&self) -> NaiveDate {
        self.start_date
            .checked_add_signed(Duration::days(i64::from(self.window_days()) - 1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date()
    }

    pub fn has_hack(&self, hack: Hack) -> bool {
        self.hacks.contains(&hack)
    }

    pub fn checkin_on(&self, date: NaiveDate) -> Option<&CheckIn> {
        self.checkins.iter().find(|c| c.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn merchant_scope_matches_canonical_or_raw() {
        let scope = ChallengeScope::Merchant("Starbucks".to_string());
        let tx = Transaction::expense(day(1), Decimal::from(5), "STARBUCKS #12");
        assert!(scope.is_violated_by(&tx));

        let other = Transaction::expense(day(1), Decimal::from(5), "Blue Bottle");
        assert!(!scope.is_violated_by(&other));
    }

    #[test]
    fn income_never_violates() {
        let scope = ChallengeScope::Category(Category::Income);
        let tx = Transaction::income(day(1), Decimal::from(500), "Payroll");
        assert!(!scope.is_violated_by(&tx));
    }

    #[test]
    fn scope_serializes_tagged() {
        let scope = ChallengeScope::Category(Category::Dining);
        let json = serde_json::to_value(&scope).unwrap();
        assert_eq!(json, serde_json::json!({"type": "category", "value": "dining"}));
    }

    #[test]
    fn hack_parse_accepts_aliases() {
        assert_eq!(Hack::parse("round-ups"), Some(Hack::Roundups));
        assert_eq!(Hack::parse("Set_And_Forget"), Some(Hack::SetForget));
        assert_eq!(Hack::parse("lottery"), None);
    }

    #[test]
    fn end_date_is_inclusive() {
        let challenge = Challenge {
            id: Id::from_string("c1"),
            name: "No coffee".to_string(),
            scope: ChallengeScope::Category(Category::Coffee),
            start_date: day(1),
            duration_days: 7,
            estimated_daily_saving: Decimal::from(4),
            hacks: vec![],
            checkins: vec![],
            best_streak: 0,
        };
        assert_eq!(challenge.end_date(), day(7));
        assert!(challenge.contains(day(7)));
        assert!(!challenge.contains(day(8)));
    }

    #[test]
    fn oversized_duration_is_clamped() {
        let challenge = Challenge {
            id: Id::from_string("c1"),
            name: "No coffee".to_string(),
            scope: ChallengeScope::Category(Category::Coffee),
            start_date: day(1),
            duration_days: 4_000_000_000,
            estimated_daily_saving: Decimal::from(4),
            hacks: vec![],
            checkins: vec![],
            best_streak: 0,
        };
        assert_eq!(challenge.window_days(), MAX_DURATION_DAYS);
        assert_eq!(challenge.end_date(), day(1) + Duration::days(364));

        let far = Challenge {
            start_date: NaiveDate::MAX - Duration::days(3),
            ..challenge
        };
        assert_eq!(far.end_date(), NaiveDate::MAX);
    }
}
