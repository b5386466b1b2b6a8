//! Demo customers with about three months of believable history.
//!
//! Output depends only on `today`: customer ids are fixed and amounts follow
//! a fixed pattern, so seeding twice on the same day rewrites identical data.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::challenges::{self, ChallengeSettings, NewChallenge};
use crate::clock::Clock;
use crate::goals;
use crate::ledger::TransactionLedger;
use crate::models::{
    Category, ChallengeScope, CustomerProfile, Hack, Id, IdGenerator, Transaction,
    TransactionKind,
};
use crate::storage::Storage;

const SEED_DAYS: i64 = 90;

#[derive(Clone, Copy)]
enum Cadence {
    /// Every `days` days, starting `offset` days into the window.
    Every { days: i64, offset: i64 },
    Weekdays(&'static [Weekday]),
    MonthDay(u32),
}

impl Cadence {
    fn hits(self, index: i64, date: NaiveDate) -> bool {
        match self {
            Cadence::Every { days, offset } => index >= offset && (index - offset) % days == 0,
            Cadence::Weekdays(days) => days.contains(&date.weekday()),
            Cadence::MonthDay(day) => date.day() == day,
        }
    }
}

struct Habit {
    raw: &'static str,
    kind: TransactionKind,
    base_cents: i64,
    /// Extra cents added in a repeating pattern; zero for fixed charges.
    spread_cents: i64,
    cadence: Cadence,
}

const fn spend(raw: &'static str, base_cents: i64, spread_cents: i64, cadence: Cadence) -> Habit {
    Habit {
        raw,
        kind: TransactionKind::Expense,
        base_cents,
        spread_cents,
        cadence,
    }
}

const fn earn(raw: &'static str, base_cents: i64, cadence: Cadence) -> Habit {
    Habit {
        raw,
        kind: TransactionKind::Income,
        base_cents,
        spread_cents: 0,
        cadence,
    }
}

enum SeedScope {
    Category(Category),
    Merchant(&'static str),
}

struct Persona {
    id: &'static str,
    name: &'static str,
    age: u32,
    monthly_income: i64,
    habits: &'static [Habit],
    goal_name: &'static str,
    goal_target: i64,
    goal_deadline_days: i64,
    goal_deposit: i64,
    challenge_name: &'static str,
    challenge_scope: SeedScope,
    /// Days before today the challenge started.
    challenge_started: i64,
    challenge_days: u32,
    challenge_hacks: &'static [Hack],
    /// Days before today of the one in-scope purchase during the challenge.
    challenge_slip: Option<i64>,
}

const WEEKDAYS: &[Weekday] = &[Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];

const PERSONAS: &[Persona] = &[
    Persona {
        id: "demo-maya",
        name: "Maya Chen",
        age: 28,
        monthly_income: 4200,
        habits: &[
            earn("ACME CORP PAYROLL", 210000, Cadence::Every { days: 14, offset: 4 }),
            spend("STARBUCKS #4821 SAN FRANCISCO CA", 545, 180, Cadence::Weekdays(WEEKDAYS)),
            spend("SQ *BLUE BOTTLE COFFEE", 625, 100, Cadence::Weekdays(&[Weekday::Sat])),
            spend("DOORDASH*THAI BASIL", 2850, 1400, Cadence::Every { days: 4, offset: 1 }),
            spend("TST* SWEETGREEN", 1495, 300, Cadence::Weekdays(&[Weekday::Wed])),
            spend("TRADER JOE'S #552", 6400, 2500, Cadence::Weekdays(&[Weekday::Sun])),
            spend("LYFT *RIDE", 1650, 900, Cadence::Every { days: 6, offset: 2 }),
            spend("NETFLIX.COM", 1549, 0, Cadence::MonthDay(7)),
            spend("SPOTIFY USA", 1199, 0, Cadence::MonthDay(18)),
            spend("RENT PAYMENT", 165000, 0, Cadence::MonthDay(1)),
            spend("PG&E WEB ONLINE", 7200, 1800, Cadence::MonthDay(12)),
            spend("AMAZON MKTPLACE PMTS", 3299, 4000, Cadence::Every { days: 11, offset: 5 }),
        ],
        goal_name: "Emergency fund",
        goal_target: 3000,
        goal_deadline_days: 180,
        goal_deposit: 250,
        challenge_name: "Brew at home",
        challenge_scope: SeedScope::Category(Category::Coffee),
        challenge_started: 9,
        challenge_days: 21,
        challenge_hacks: &[Hack::Roundups, Hack::SwearJar],
        challenge_slip: Some(4),
    },
    Persona {
        id: "demo-jordan",
        name: "Jordan Ellis",
        age: 41,
        monthly_income: 6800,
        habits: &[
            earn("GLOBEX DIRECT DEP", 340000, Cadence::Every { days: 14, offset: 0 }),
            spend("COSTCO WHSE #0117", 18500, 6000, Cadence::Weekdays(&[Weekday::Sat])),
            spend("SHELL OIL 57442", 5200, 1500, Cadence::Every { days: 8, offset: 3 }),
            spend("DOORDASH*CHIPOTLE", 4100, 1800, Cadence::Weekdays(&[Weekday::Fri])),
            spend("UBER EATS", 3600, 1200, Cadence::Weekdays(&[Weekday::Tue])),
            spend("NETFLIX.COM", 2299, 0, Cadence::MonthDay(3)),
            spend("DISNEY PLUS", 1399, 0, Cadence::MonthDay(9)),
            spend("HULU 877-8244858", 1799, 0, Cadence::MonthDay(14)),
            spend("PLANET FITNESS", 2499, 0, Cadence::MonthDay(17)),
            spend("COMCAST CABLE", 11000, 0, Cadence::MonthDay(20)),
            spend("AMZN MKTP US", 4700, 5200, Cadence::Every { days: 5, offset: 2 }),
            spend("AMC THEATRES 0442", 4200, 1200, Cadence::Every { days: 21, offset: 6 }),
        ],
        goal_name: "Family vacation",
        goal_target: 5000,
        goal_deadline_days: 240,
        goal_deposit: 400,
        challenge_name: "Takeout-free fortnight",
        challenge_scope: SeedScope::Category(Category::Dining),
        challenge_started: 12,
        challenge_days: 14,
        challenge_hacks: &[Hack::SmartSave],
        challenge_slip: None,
    },
    Persona {
        id: "demo-rosa",
        name: "Rosa Martinez",
        age: 67,
        monthly_income: 3100,
        habits: &[
            earn("SOCIAL SECURITY DIRECT DEP", 310000, Cadence::MonthDay(3)),
            spend("SAFEWAY #1867", 7800, 3500, Cadence::Weekdays(&[Weekday::Mon, Weekday::Thu])),
            spend("CVS/PHARMACY #08812", 2450, 2000, Cadence::Every { days: 10, offset: 4 }),
            spend("PEET'S COFFEE", 475, 150, Cadence::Weekdays(&[Weekday::Sun])),
            spend("PG&E WEB ONLINE", 9800, 2200, Cadence::MonthDay(15)),
            spend("XFINITY MOBILE", 6500, 0, Cadence::MonthDay(22)),
            spend("AMAZON.COM*2K4", 2899, 3000, Cadence::Every { days: 9, offset: 1 }),
            spend("AMC THEATRES 0129", 1800, 600, Cadence::Every { days: 28, offset: 10 }),
        ],
        goal_name: "New laptop",
        goal_target: 1200,
        goal_deadline_days: 90,
        goal_deposit: 150,
        challenge_name: "Amazon pause",
        challenge_scope: SeedScope::Merchant("Amazon"),
        challenge_started: 3,
        challenge_days: 7,
        challenge_hacks: &[Hack::SetForget],
        challenge_slip: None,
    },
];

fn varied_amount(habit: &Habit, index: i64, salt: i64) -> Decimal {
    let extra = if habit.spread_cents > 0 {
        (index * 37 + salt * 11) % (habit.spread_cents + 1)
    } else {
        0
    };
    Decimal::new(habit.base_cents + extra, 2)
}

/// Create (or overwrite) the demo customers and their data.
pub async fn seed_demo(
    storage: &dyn Storage,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    settings: &ChallengeSettings,
    today: NaiveDate,
) -> Result<Vec<CustomerProfile>> {
    let mut created = Vec::with_capacity(PERSONAS.len());
    for persona in PERSONAS {
        let profile = seed_persona(storage, clock, ids, settings, today, persona)
            .await
            .with_context(|| format!("Failed to seed demo customer {}", persona.name))?;
        created.push(profile);
    }
    Ok(created)
}

async fn seed_persona(
    storage: &dyn Storage,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    settings: &ChallengeSettings,
    today: NaiveDate,
    persona: &Persona,
) -> Result<CustomerProfile> {
    let mut profile = CustomerProfile::new_with_generator(ids, clock, persona.name, persona.age)
        .with_monthly_income(Decimal::from(persona.monthly_income));
    profile.id = Id::from_string(persona.id);

    let scope = match persona.challenge_scope {
        SeedScope::Category(category) => ChallengeScope::Category(category),
        SeedScope::Merchant(name) => ChallengeScope::Merchant(name.to_string()),
    };
    let challenge_start = today - Duration::days(persona.challenge_started);
    let slip = persona.challenge_slip.map(|d| today - Duration::days(d));

    let first_day = today - Duration::days(SEED_DAYS - 1);
    let mut transactions = Vec::new();
    for index in 0..SEED_DAYS {
        let date = first_day + Duration::days(index);
        for (salt, habit) in persona.habits.iter().enumerate() {
            if !habit.cadence.hits(index, date) {
                continue;
            }
            let tx = Transaction::new_with_generator(
                ids,
                date,
                varied_amount(habit, index, salt as i64),
                habit.kind,
                habit.raw,
            );
            // The customer is sticking to the challenge, apart from one slip.
            if date >= challenge_start && scope.is_violated_by(&tx) && Some(date) != slip {
                continue;
            }
            transactions.push(tx);
        }
    }
    let transactions = TransactionLedger::new(transactions).into_vec();

    let goal_created = today - Duration::days(60);
    let mut goal = goals::create_goal(
        ids,
        persona.goal_name,
        Decimal::from(persona.goal_target),
        Some(today + Duration::days(persona.goal_deadline_days)),
        goal_created,
    )?;
    for days_ago in [55, 25] {
        goals::contribute(
            &mut goal,
            Decimal::from(persona.goal_deposit),
            today - Duration::days(days_ago),
        )?;
    }

    let mut challenge = challenges::create_challenge(
        ids,
        NewChallenge {
            name: persona.challenge_name.to_string(),
            scope,
            start_date: challenge_start,
            duration_days: persona.challenge_days,
            hacks: persona.challenge_hacks.to_vec(),
        },
        &transactions,
        challenge_start,
        settings,
    )?;
    challenges::auto_checkin(&mut challenge, &transactions, today, settings);

    storage.save_customer(&profile).await?;
    storage.save_transactions(&profile.id, &transactions).await?;
    storage.save_goals(&profile.id, &[goal]).await?;
    storage.save_challenges(&profile.id, &[challenge]).await?;

    tracing::info!(
        customer = %profile.id,
        transactions = transactions.len(),
        "Seeded demo customer"
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{CheckInStatus, SequentialIdGenerator};
    use crate::storage::MemoryStorage;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 15).unwrap()
    }

    async fn seeded() -> Result<MemoryStorage> {
        let storage = MemoryStorage::new();
        let ids = SequentialIdGenerator::new("seed");
        seed_demo(
            &storage,
            &FixedClock::on(today()),
            &ids,
            &ChallengeSettings::default(),
            today(),
        )
        .await?;
        Ok(storage)
    }

    #[tokio::test]
    async fn seeds_three_customers_with_history() -> Result<()> {
        let storage = seeded().await?;
        let customers = storage.list_customers().await?;
        let names: Vec<&str> = customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Jordan Ellis", "Maya Chen", "Rosa Martinez"]);

        for customer in &customers {
            let txns = storage.get_transactions(&customer.id).await?;
            assert!(txns.len() > 60, "{} has {} transactions", customer.name, txns.len());
            assert!(txns.windows(2).all(|w| w[0].date >= w[1].date));
            assert!(txns.iter().all(|t| t.date <= today()));
            assert!(txns.iter().all(|t| t.date > today() - Duration::days(SEED_DAYS)));
            assert_eq!(storage.get_goals(&customer.id).await?.len(), 1);
            assert_eq!(storage.get_challenges(&customer.id).await?.len(), 1);
        }
        Ok(())
    }

    #[tokio::test]
    async fn maya_challenge_has_one_slip() -> Result<()> {
        let storage = seeded().await?;
        let challenges = storage.get_challenges(&Id::from_string("demo-maya")).await?;
        let challenge = &challenges[0];
        assert_eq!(challenge.checkins.len(), 9);
        let missed: Vec<NaiveDate> = challenge
            .checkins
            .iter()
            .filter(|c| c.status == CheckInStatus::Missed)
            .map(|c| c.date)
            .collect();
        // The slip is only recorded as missed if it falls on a coffee day.
        assert!(missed.len() <= 1);
        assert!(challenge.best_streak >= 4);
        Ok(())
    }

    #[tokio::test]
    async fn seeding_twice_is_stable() -> Result<()> {
        let first = seeded().await?;
        let second = seeded().await?;
        let id = Id::from_string("demo-jordan");
        assert_eq!(first.get_transactions(&id).await?, second.get_transactions(&id).await?);
        assert_eq!(first.get_challenges(&id).await?, second.get_challenges(&id).await?);
        Ok(())
    }
}
