mod support;

use anyhow::Result;
use rust_decimal::Decimal;
use spendwise::app::{self, NewChallengeArgs};
use spendwise::challenges::{ChallengeStatus, DayState};
use spendwise::ledger::TransactionPatch;
use spendwise::models::{Hack, SequentialIdGenerator};
use spendwise::storage::JsonFileStorage;
use tempfile::TempDir;

use support::{add_customer, clock, day, expense, utc_config};

#[tokio::test]
async fn challenge_from_start_to_finish() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    let config = utc_config(dir.path());
    let ids = SequentialIdGenerator::new("t");
    let june_10 = clock(day(2026, 6, 10));

    let customer = add_customer(&storage, "Maya", day(2026, 6, 10)).await?;
    // $60 of coffee in the 30-day baseline gives a $2.00 daily estimate.
    for d in [12, 18, 24, 30] {
        app::add_transaction_with(
            &storage,
            &config,
            &customer,
            expense(day(2026, 5, d), "15.00", "STARBUCKS #12"),
            &ids,
            &june_10,
        )
        .await?;
    }
    let created = app::add_challenge_with(
        &storage,
        &config,
        &customer,
        NewChallengeArgs {
            name: None,
            scope: "coffee".to_string(),
            start_date: Some(day(2026, 6, 5)),
            duration_days: 7,
            hacks: vec![Hack::Roundups],
        },
        &ids,
        &june_10,
    )
    .await?;
    assert_eq!(created["challenge"]["name"], "No coffee");
    let estimate: Decimal = created["challenge"]["estimated_daily_saving"]
        .as_str()
        .unwrap_or_default()
        .parse()?;
    assert_eq!(estimate, Decimal::from(2));
    assert_eq!(created["challenge"]["progress"]["days_done"], 5);

    // A coffee logged late for an already-recorded day turns it into a miss.
    let late = app::add_transaction_with(
        &storage,
        &config,
        &customer,
        expense(day(2026, 6, 7), "4.25", "Starbucks"),
        &ids,
        &june_10,
    )
    .await?;
    assert_eq!(late.nudges.len(), 1);

    let listed = app::list_challenges(&storage, &config, &customer, &june_10).await?;
    let progress = &listed[0].progress;
    assert_eq!(progress.status, ChallengeStatus::Active);
    assert_eq!(progress.days_done, 4);
    assert_eq!(progress.days_missed, 1);
    assert_eq!(progress.current_streak, 2);
    // 06-05..06-09 were a five-day run when recorded; the late miss does not lower the record.
    assert_eq!(progress.best_streak, 5);
    assert_eq!(progress.total_saved, Decimal::new(875, 2));

    let checked = app::check_in_challenge(&storage, &config, &customer, "No coffee", None, &june_10)
        .await?;
    assert_eq!(checked["checkin"]["status"], "done");
    assert_eq!(checked["challenge"]["progress"]["current_streak"], 3);

    // A coffee the next day breaks the streak and returns a nudge.
    let june_11 = clock(day(2026, 6, 11));
    let added = app::add_transaction_with(
        &storage,
        &config,
        &customer,
        expense(day(2026, 6, 11), "3.50", "PEET'S COFFEE"),
        &ids,
        &june_11,
    )
    .await?;
    assert_eq!(added.nudges.len(), 1);
    assert!(added.nudges[0].contains("No coffee"));

    let listed = app::list_challenges(&storage, &config, &customer, &june_11).await?;
    assert_eq!(listed[0].progress.current_streak, 0);
    assert_eq!(listed[0].progress.best_streak, 5);
    assert_eq!(listed[0].progress.days_missed, 2);

    let future = app::check_in_challenge(
        &storage,
        &config,
        &customer,
        "No coffee",
        Some(day(2026, 6, 12)),
        &june_11,
    )
    .await;
    assert!(future.is_err());

    let cells = app::challenge_calendar(&storage, &config, &customer, "No coffee", None, &june_11)
        .await?;
    let states: Vec<DayState> = cells.iter().map(|c| c.state).collect();
    assert_eq!(
        states,
        vec![
            DayState::Done,
            DayState::Done,
            DayState::Missed,
            DayState::Done,
            DayState::Done,
            DayState::Done,
            DayState::Missed,
        ]
    );

    let later = clock(day(2026, 6, 20));
    let listed = app::list_challenges(&storage, &config, &customer, &later).await?;
    assert_eq!(listed[0].progress.status, ChallengeStatus::Completed);
    assert_eq!(listed[0].progress.days_remaining, 0);
    assert_eq!(listed[0].progress.best_streak, 5);
    Ok(())
}

#[tokio::test]
async fn reading_twice_does_not_change_state() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    let config = utc_config(dir.path());
    let ids = SequentialIdGenerator::new("t");
    let today = clock(day(2026, 3, 20));

    let customer = add_customer(&storage, "Jordan", day(2026, 3, 1)).await?;
    app::add_challenge_with(
        &storage,
        &config,
        &customer,
        NewChallengeArgs {
            name: Some("Amazon pause".to_string()),
            scope: "merchant:amazon".to_string(),
            start_date: Some(day(2026, 3, 10)),
            duration_days: 14,
            hacks: vec![Hack::SetForget],
        },
        &ids,
        &today,
    )
    .await?;

    let first = app::list_challenges(&storage, &config, &customer, &today).await?;
    let second = app::list_challenges(&storage, &config, &customer, &today).await?;
    assert_eq!(first[0].progress, second[0].progress);
    assert_eq!(first[0].progress.days_done, 10);
    // Minimum estimate plus the fixed daily transfer.
    assert_eq!(first[0].progress.total_saved, Decimal::from(20));
    Ok(())
}

async fn coffee_week(
    storage: &JsonFileStorage,
    config: &spendwise::config::ResolvedConfig,
    customer: &str,
    ids: &SequentialIdGenerator,
) -> Result<()> {
    app::add_challenge_with(
        storage,
        config,
        customer,
        NewChallengeArgs {
            name: None,
            scope: "coffee".to_string(),
            start_date: Some(day(2026, 6, 5)),
            duration_days: 7,
            hacks: vec![],
        },
        ids,
        &clock(day(2026, 6, 10)),
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn editing_an_expense_rechecks_challenge_days() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    let config = utc_config(dir.path());
    let ids = SequentialIdGenerator::new("t");
    let june_10 = clock(day(2026, 6, 10));

    let customer = add_customer(&storage, "Maya", day(2026, 6, 1)).await?;
    let target = app::add_transaction_with(
        &storage,
        &config,
        &customer,
        expense(day(2026, 6, 7), "12.00", "TARGET 00021"),
        &ids,
        &june_10,
    )
    .await?;
    coffee_week(&storage, &config, &customer, &ids).await?;

    let listed = app::list_challenges(&storage, &config, &customer, &june_10).await?;
    assert_eq!(listed[0].progress.days_done, 5);

    // Re-labelled as coffee: 06-07 becomes a miss.
    let to_coffee = TransactionPatch {
        raw_merchant: Some("Starbucks".to_string()),
        ..Default::default()
    };
    app::update_transaction(
        &storage,
        &config,
        &customer,
        &target.transaction.id,
        to_coffee,
        &june_10,
    )
    .await?;
    let listed = app::list_challenges(&storage, &config, &customer, &june_10).await?;
    assert_eq!(listed[0].progress.days_done, 4);
    assert_eq!(listed[0].progress.days_missed, 1);

    // Moved before the window: 06-07 is clean again.
    let earlier = TransactionPatch {
        date: Some(day(2026, 6, 2)),
        ..Default::default()
    };
    app::update_transaction(
        &storage,
        &config,
        &customer,
        &target.transaction.id,
        earlier,
        &june_10,
    )
    .await?;
    let listed = app::list_challenges(&storage, &config, &customer, &june_10).await?;
    assert_eq!(listed[0].progress.days_done, 5);
    assert_eq!(listed[0].progress.days_missed, 0);

    // Moved onto today: today is recorded as lost.
    let onto_today = TransactionPatch {
        date: Some(day(2026, 6, 10)),
        ..Default::default()
    };
    app::update_transaction(
        &storage,
        &config,
        &customer,
        &target.transaction.id,
        onto_today,
        &june_10,
    )
    .await?;
    let cells = app::challenge_calendar(&storage, &config, &customer, "No coffee", None, &june_10)
        .await?;
    assert_eq!(cells[5].state, DayState::Missed);
    Ok(())
}

#[tokio::test]
async fn deleting_the_only_slip_restores_the_day() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    let config = utc_config(dir.path());
    let ids = SequentialIdGenerator::new("t");
    let june_10 = clock(day(2026, 6, 10));

    let customer = add_customer(&storage, "Maya", day(2026, 6, 1)).await?;
    coffee_week(&storage, &config, &customer, &ids).await?;
    let slip = app::add_transaction_with(
        &storage,
        &config,
        &customer,
        expense(day(2026, 6, 7), "4.25", "Starbucks"),
        &ids,
        &june_10,
    )
    .await?;
    assert_eq!(slip.nudges.len(), 1);
    let listed = app::list_challenges(&storage, &config, &customer, &june_10).await?;
    assert_eq!(listed[0].progress.days_missed, 1);

    let deleted =
        app::delete_transaction(&storage, &config, &customer, &slip.transaction.id, &june_10)
            .await?;
    assert_eq!(deleted["success"], true);

    let listed = app::list_challenges(&storage, &config, &customer, &june_10).await?;
    assert_eq!(listed[0].progress.days_done, 5);
    assert_eq!(listed[0].progress.days_missed, 0);
    assert_eq!(listed[0].progress.best_streak, 5);
    Ok(())
}
