use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

use super::{Id, IdGenerator, UuidIdGenerator};

/// Peer cohort used for spend benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "18-24")]
    Age18To24,
    #[serde(rename = "25-34")]
    Age25To34,
    #[serde(rename = "35-44")]
    Age35To44,
    #[serde(rename = "45-54")]
    Age45To54,
    #[serde(rename = "55-64")]
    Age55To64,
    #[serde(rename = "65+")]
    Age65Plus,
}

impl AgeBand {
    /// Ages under 18 fold into the youngest band.
    pub fn for_age(age: u32) -> Self {
        match age {
            0..=24 => AgeBand::Age18To24,
            25..=34 => AgeBand::Age25To34,
            35..=44 => AgeBand::Age35To44,
            45..=54 => AgeBand::Age45To54,
            55..=64 => AgeBand::Age55To64,
            _ => AgeBand::Age65Plus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Age18To24 => "18-24",
            AgeBand::Age25To34 => "25-34",
            AgeBand::Age35To44 => "35-44",
            AgeBand::Age45To54 => "45-54",
            AgeBand::Age55To64 => "55-64",
            AgeBand::Age65Plus => "65+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: Id,
    pub name: String,
    pub age: u32,
    /// Expected monthly take-home pay; used by affordability answers.
    #[serde(default)]
    pub monthly_income: Decimal,
    pub created_at: DateTime<Utc>,
}

impl CustomerProfile {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self::new_with_generator(&UuidIdGenerator, &SystemClock, name, age)
    }

    pub fn new_with_generator(
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
        name: impl Into<String>,
        age: u32,
    ) -> Self {
        Self {
            id: ids.new_id(),
            name: name.into(),
            age,
            monthly_income: Decimal::ZERO,
            created_at: clock.now(),
        }
    }

    pub fn with_monthly_income(mut self, income: Decimal) -> Self {
        self.monthly_income = income;
        self
    }

    pub fn age_band(&self) -> AgeBand {
        AgeBand::for_age(self.age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_band_boundaries() {
        assert_eq!(AgeBand::for_age(16), AgeBand::Age18To24);
        assert_eq!(AgeBand::for_age(24), AgeBand::Age18To24);
        assert_eq!(AgeBand::for_age(25), AgeBand::Age25To34);
        assert_eq!(AgeBand::for_age(64), AgeBand::Age55To64);
        assert_eq!(AgeBand::for_age(65), AgeBand::Age65Plus);
    }

    #[test]
    fn age_band_serializes_as_label() {
        let json = serde_json::to_string(&AgeBand::Age65Plus).unwrap();
        assert_eq!(json, "\"65+\"");
    }
}
