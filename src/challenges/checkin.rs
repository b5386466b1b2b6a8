use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{Challenge, CheckIn, CheckInStatus, Hack, Transaction};

use super::progress::longest_streak;
use super::{ChallengeError, ChallengeSettings};

/// Expenses on `date` that break the challenge.
pub fn violations_on<'a>(
    challenge: &Challenge,
    date: NaiveDate,
    transactions: &'a [Transaction],
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| t.date == date && challenge.scope.is_violated_by(t))
        .collect()
}

/// Record outcomes for every elapsed window day that has no check-in yet.
///
/// Today is only recorded when it is already lost; a clean day stays open
/// until it is over or the user checks in. Existing check-ins are never
/// rewritten, so repeated calls converge on the same state.
///
/// Returns the dates that were newly recorded.
pub fn auto_checkin(
    challenge: &mut Challenge,
    transactions: &[Transaction],
    today: NaiveDate,
    settings: &ChallengeSettings,
) -> Vec<NaiveDate> {
    let mut recorded = Vec::new();
    let last_closed = (today - Duration::days(1)).min(challenge.end_date());

    let mut date = challenge.start_date;
    while date <= last_closed {
        if challenge.checkin_on(date).is_none() {
            let checkin = evaluate(challenge, date, transactions, settings, true);
            challenge.checkins.push(checkin);
            recorded.push(date);
        }
        date += Duration::days(1);
    }

    if challenge.contains(today)
        && challenge.checkin_on(today).is_none()
        && !violations_on(challenge, today, transactions).is_empty()
    {
        let checkin = evaluate(challenge, today, transactions, settings, true);
        challenge.checkins.push(checkin);
        recorded.push(today);
    }

    if !recorded.is_empty() {
        finalize(challenge);
        tracing::debug!(
            challenge = %challenge.id,
            days = recorded.len(),
            "Auto check-in recorded days"
        );
    }
    recorded
}

/// Manually check in for `date`, replacing any earlier record for that day.
///
/// A day with an in-scope expense is always recorded as missed.
pub fn check_in(
    challenge: &mut Challenge,
    date: NaiveDate,
    transactions: &[Transaction],
    today: NaiveDate,
    settings: &ChallengeSettings,
) -> Result<CheckIn, ChallengeError> {
    if date > today {
        return Err(ChallengeError::FutureDate { date, today });
    }
    if !challenge.contains(date) {
        return Err(ChallengeError::OutsideWindow {
            date,
            start: challenge.start_date,
            end: challenge.end_date(),
        });
    }

    let checkin = evaluate(challenge, date, transactions, settings, false);
    challenge.checkins.retain(|c| c.date != date);
    challenge.checkins.push(checkin.clone());
    finalize(challenge);
    Ok(checkin)
}

/// Re-evaluate a recorded day after the ledger changed under it.
///
/// Only days that already have a check-in are touched, and the record keeps
/// its `auto` flag. An automatic record for today that is no longer broken is
/// dropped so the day is open again. Returns true when the record changed.
pub fn reevaluate(
    challenge: &mut Challenge,
    date: NaiveDate,
    transactions: &[Transaction],
    today: NaiveDate,
    settings: &ChallengeSettings,
) -> bool {
    let Some(existing) = challenge.checkin_on(date).cloned() else {
        return false;
    };
    let updated = evaluate(challenge, date, transactions, settings, existing.auto);
    challenge.checkins.retain(|c| c.date != date);
    if date == today && existing.auto && updated.status == CheckInStatus::Done {
        finalize(challenge);
        return true;
    }
    let changed = updated != existing;
    challenge.checkins.push(updated);
    finalize(challenge);
    changed
}

fn evaluate(
    challenge: &Challenge,
    date: NaiveDate,
    transactions: &[Transaction],
    settings: &ChallengeSettings,
    auto: bool,
) -> CheckIn {
    let violated = !violations_on(challenge, date, transactions).is_empty();
    let status = if violated {
        CheckInStatus::Missed
    } else {
        CheckInStatus::Done
    };

    let mut saved = Decimal::ZERO;
    let mut penalty = Decimal::ZERO;

    if status == CheckInStatus::Done {
        saved += challenge.estimated_daily_saving;
        if challenge.has_hack(Hack::SmartSave) {
            saved += challenge.estimated_daily_saving * settings.smart_save_percent
                / Decimal::ONE_HUNDRED;
        }
    } else if challenge.has_hack(Hack::SwearJar) {
        penalty = settings.swear_jar_penalty;
        saved += penalty;
    }
    if challenge.has_hack(Hack::Roundups) {
        saved += roundups_on(date, transactions);
    }
    if challenge.has_hack(Hack::SetForget) {
        saved += settings.set_forget_daily;
    }

    CheckIn {
        date,
        status,
        saved: saved.round_dp(2),
        penalty: penalty.round_dp(2),
        auto,
    }
}

/// Spare change from rounding each of the day's expenses up to a whole unit.
fn roundups_on(date: NaiveDate, transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.date == date && t.is_expense())
        .map(|t| t.amount.ceil() - t.amount)
        .sum()
}

fn finalize(challenge: &mut Challenge) {
    challenge.checkins.sort_by_key(|c| c.date);
    let longest = longest_streak(&challenge.checkins);
    challenge.best_streak = challenge.best_streak.max(longest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ChallengeScope, Id};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, d).unwrap()
    }

    fn coffee_challenge(hacks: Vec<Hack>) -> Challenge {
        Challenge {
            id: Id::from_string("ch-coffee"),
            name: "Skip coffee".to_string(),
            scope: ChallengeScope::Category(Category::Coffee),
            start_date: day(1),
            duration_days: 10,
            estimated_daily_saving: Decimal::from(4),
            hacks,
            checkins: vec![],
            best_streak: 0,
        }
    }

    fn coffee(d: u32) -> Transaction {
        Transaction::expense(day(d), Decimal::new(550, 2), "Starbucks")
    }

    #[test]
    fn auto_checkin_fills_elapsed_days() {
        let mut challenge = coffee_challenge(vec![]);
        let txns = vec![coffee(3)];
        let recorded = auto_checkin(&mut challenge, &txns, day(5), &ChallengeSettings::default());

        assert_eq!(recorded, vec![day(1), day(2), day(3), day(4)]);
        let statuses: Vec<CheckInStatus> = challenge.checkins.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![
                CheckInStatus::Done,
                CheckInStatus::Done,
                CheckInStatus::Missed,
                CheckInStatus::Done
            ]
        );
        assert!(challenge.checkins.iter().all(|c| c.auto));
        assert_eq!(challenge.checkins[0].saved, Decimal::from(4));
        assert_eq!(challenge.checkins[2].saved, Decimal::ZERO);
        assert_eq!(challenge.best_streak, 2);
    }

    #[test]
    fn auto_checkin_is_idempotent() {
        let mut challenge = coffee_challenge(vec![Hack::Roundups]);
        let txns = vec![coffee(2)];
        let settings = ChallengeSettings::default();
        auto_checkin(&mut challenge, &txns, day(4), &settings);
        let snapshot = challenge.clone();

        let second = auto_checkin(&mut challenge, &txns, day(4), &settings);
        assert!(second.is_empty());
        assert_eq!(challenge, snapshot);
    }

    #[test]
    fn auto_checkin_flags_today_only_on_violation() {
        let settings = ChallengeSettings::default();

        let mut clean = coffee_challenge(vec![]);
        auto_checkin(&mut clean, &[], day(1), &settings);
        assert!(clean.checkins.is_empty());

        let mut broken = coffee_challenge(vec![]);
        auto_checkin(&mut broken, &[coffee(1)], day(1), &settings);
        assert_eq!(broken.checkins.len(), 1);
        assert_eq!(broken.checkins[0].status, CheckInStatus::Missed);
    }

    #[test]
    fn auto_checkin_stops_at_window_end() {
        let mut challenge = coffee_challenge(vec![]);
        auto_checkin(&mut challenge, &[], day(25), &ChallengeSettings::default());
        assert_eq!(challenge.checkins.len(), 10);
        assert_eq!(challenge.best_streak, 10);
    }

    #[test]
    fn reevaluate_follows_ledger_changes() {
        let settings = ChallengeSettings::default();
        let mut challenge = coffee_challenge(vec![]);
        auto_checkin(&mut challenge, &[coffee(3)], day(5), &settings);
        assert_eq!(challenge.checkin_on(day(3)).unwrap().status, CheckInStatus::Missed);

        // Coffee removed from the ledger.
        assert!(reevaluate(&mut challenge, day(3), &[], day(5), &settings));
        let record = challenge.checkin_on(day(3)).unwrap();
        assert_eq!(record.status, CheckInStatus::Done);
        assert!(record.auto);
        assert_eq!(challenge.best_streak, 4);

        assert!(!reevaluate(&mut challenge, day(3), &[], day(5), &settings));
        // Unrecorded days are left alone.
        assert!(!reevaluate(&mut challenge, day(7), &[coffee(7)], day(8), &settings));
        assert!(challenge.checkin_on(day(7)).is_none());
    }

    #[test]
    fn reevaluate_reopens_clean_today() {
        let settings = ChallengeSettings::default();
        let mut challenge = coffee_challenge(vec![]);
        auto_checkin(&mut challenge, &[coffee(2)], day(2), &settings);
        assert_eq!(challenge.checkin_on(day(2)).unwrap().status, CheckInStatus::Missed);

        assert!(reevaluate(&mut challenge, day(2), &[], day(2), &settings));
        assert!(challenge.checkin_on(day(2)).is_none());
    }

    #[test]
    fn hacks_add_to_saved_amount() {
        let settings = ChallengeSettings::default();
        let mut challenge = coffee_challenge(vec![Hack::Roundups, Hack::SmartSave, Hack::SetForget]);
        // 12.30 rounds up by 0.70; not a coffee purchase so the day is done.
        let txns = vec![Transaction::expense(day(1), Decimal::new(1230, 2), "Target")];
        let checkin = check_in(&mut challenge, day(1), &txns, day(1), &settings).unwrap();

        assert_eq!(checkin.status, CheckInStatus::Done);
        // 4 + 0.40 smart save + 0.70 roundup + 1 set & forget
        assert_eq!(checkin.saved, Decimal::new(610, 2));
        assert!(!checkin.auto);
    }

    #[test]
    fn swear_jar_penalty_on_missed_day() {
        let settings = ChallengeSettings::default();
        let mut challenge = coffee_challenge(vec![Hack::SwearJar, Hack::Roundups]);
        let checkin = check_in(&mut challenge, day(2), &[coffee(2)], day(3), &settings).unwrap();

        assert_eq!(checkin.status, CheckInStatus::Missed);
        assert_eq!(checkin.penalty, Decimal::from(5));
        // penalty + 0.50 roundup from the 5.50 coffee
        assert_eq!(checkin.saved, Decimal::new(550, 2));
    }

    #[test]
    fn manual_checkin_replaces_existing_record() {
        let settings = ChallengeSettings::default();
        let mut challenge = coffee_challenge(vec![]);
        check_in(&mut challenge, day(2), &[], day(2), &settings).unwrap();
        check_in(&mut challenge, day(2), &[coffee(2)], day(2), &settings).unwrap();

        assert_eq!(challenge.checkins.len(), 1);
        assert_eq!(challenge.checkins[0].status, CheckInStatus::Missed);
    }

    #[test]
    fn manual_checkin_rejects_future_and_out_of_window() {
        let settings = ChallengeSettings::default();
        let mut challenge = coffee_challenge(vec![]);

        let err = check_in(&mut challenge, day(6), &[], day(5), &settings).unwrap_err();
        assert_eq!(
            err,
            ChallengeError::FutureDate {
                date: day(6),
                today: day(5)
            }
        );

        let err = check_in(&mut challenge, day(12), &[], day(20), &settings).unwrap_err();
        assert!(matches!(err, ChallengeError::OutsideWindow { .. }));
        assert!(challenge.checkins.is_empty());
    }

    #[test]
    fn best_streak_never_decreases() {
        let settings = ChallengeSettings::default();
        let mut challenge = coffee_challenge(vec![]);
        auto_checkin(&mut challenge, &[], day(5), &settings);
        assert_eq!(challenge.best_streak, 4);

        // Turning a done day into a miss shortens the longest run but not the record.
        check_in(&mut challenge, day(2), &[coffee(2)], day(5), &settings).unwrap();
        assert_eq!(longest_streak(&challenge.checkins), 2);
        assert_eq!(challenge.best_streak, 4);
    }
}
