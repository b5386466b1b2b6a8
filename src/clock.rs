use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Abstraction over "current time" so check-ins and streaks are deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Clock pinned to noon UTC on the given day.
    pub fn on(date: NaiveDate) -> Self {
        let now = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// Which calendar a "day" belongs to when deciding what today is.
#[derive(Debug, Clone, PartialEq)]
pub enum DayBoundary {
    Local,
    Named(Tz),
}

impl DayBoundary {
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("local")
            || trimmed.eq_ignore_ascii_case("current")
        {
            return Ok(DayBoundary::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") {
            return Ok(DayBoundary::Named(chrono_tz::UTC));
        }
        let tz: Tz = trimmed.parse().with_context(|| {
            format!("Invalid timezone '{trimmed}' (expected IANA name, e.g. America/New_York)")
        })?;
        Ok(DayBoundary::Named(tz))
    }

    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        let now = clock.now();
        match self {
            DayBoundary::Local => now.with_timezone(&chrono::Local).date_naive(),
            DayBoundary::Named(tz) => now.with_timezone(tz).date_naive(),
        }
    }
}
