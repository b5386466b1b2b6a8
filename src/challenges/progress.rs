use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Challenge, CheckIn, CheckInStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Upcoming,
    Active,
    Completed,
}

/// Display state of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    Done,
    Missed,
    /// Today, not yet decided.
    Today,
    /// Inside the window with no check-in and not today.
    Pending,
    /// Outside the challenge window.
    Rest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub state: DayState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeProgress {
    pub status: ChallengeStatus,
    pub current_streak: u32,
    pub best_streak: u32,
    pub days_done: u32,
    pub days_missed: u32,
    pub total_saved: Decimal,
    pub total_penalties: Decimal,
    pub completion_percent: u32,
    pub days_remaining: u32,
}

fn status_by_date(checkins: &[CheckIn]) -> HashMap<NaiveDate, CheckInStatus> {
    checkins.iter().map(|c| (c.date, c.status)).collect()
}

/// Consecutive done days ending today, or ending yesterday when today has
/// no check-in yet. A missed day or a gap ends the streak.
pub fn current_streak(checkins: &[CheckIn], today: NaiveDate) -> u32 {
    let by_date = status_by_date(checkins);
    let mut cursor = match by_date.get(&today) {
        Some(CheckInStatus::Missed) => return 0,
        Some(CheckInStatus::Done) => today,
        None => today - Duration::days(1),
    };

    let mut streak = 0;
    while by_date.get(&cursor) == Some(&CheckInStatus::Done) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Longest run of consecutive done days anywhere in the history.
pub fn longest_streak(checkins: &[CheckIn]) -> u32 {
    let mut done: Vec<NaiveDate> = checkins
        .iter()
        .filter(|c| c.status == CheckInStatus::Done)
        .map(|c| c.date)
        .collect();
    done.sort();
    done.dedup();

    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for date in done {
        run = match prev {
            Some(p) if date - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(date);
    }
    best
}

/// Summary recomputed from the stored check-ins.
pub fn progress(challenge: &Challenge, today: NaiveDate) -> ChallengeProgress {
    let end = challenge.end_date();
    let status = if today < challenge.start_date {
        ChallengeStatus::Upcoming
    } else if today > end {
        ChallengeStatus::Completed
    } else {
        ChallengeStatus::Active
    };

    let in_window = challenge.checkins.iter().filter(|c| challenge.contains(c.date));
    let mut days_done = 0u32;
    let mut days_missed = 0u32;
    let mut total_saved = Decimal::ZERO;
    let mut total_penalties = Decimal::ZERO;
    for checkin in in_window {
        match checkin.status {
            CheckInStatus::Done => days_done += 1,
            CheckInStatus::Missed => days_missed += 1,
        }
        total_saved += checkin.saved;
        total_penalties += checkin.penalty;
    }

    let duration = challenge.window_days();
    let completion_percent = days_done * 100 / duration;
    let days_remaining = match status {
        ChallengeStatus::Upcoming => duration,
        ChallengeStatus::Completed => 0,
        ChallengeStatus::Active => ((end - today).num_days() + 1) as u32,
    };

    ChallengeProgress {
        status,
        current_streak: current_streak(&challenge.checkins, today),
        best_streak: challenge.best_streak.max(longest_streak(&challenge.checkins)),
        days_done,
        days_missed,
        total_saved,
        total_penalties,
        completion_percent,
        days_remaining,
    }
}

/// One cell per date in `[from, to]`.
pub fn calendar(
    challenge: &Challenge,
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Vec<DayCell> {
    let mut cells = Vec::new();
    let mut date = from;
    while date <= to {
        let checkin = challenge.checkin_on(date);
        let state = if !challenge.contains(date) {
            DayState::Rest
        } else {
            match checkin.map(|c| c.status) {
                Some(CheckInStatus::Done) => DayState::Done,
                Some(CheckInStatus::Missed) => DayState::Missed,
                None if date == today => DayState::Today,
                None => DayState::Pending,
            }
        };
        let saved = if state == DayState::Rest {
            None
        } else {
            checkin.map(|c| c.saved)
        };
        cells.push(DayCell { date, state, saved });
        date += Duration::days(1);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ChallengeScope, Id};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn done(d: u32) -> CheckIn {
        CheckIn {
            date: day(d),
            status: CheckInStatus::Done,
            saved: Decimal::from(3),
            penalty: Decimal::ZERO,
            auto: true,
        }
    }

    fn missed(d: u32) -> CheckIn {
        CheckIn {
            date: day(d),
            status: CheckInStatus::Missed,
            saved: Decimal::from(5),
            penalty: Decimal::from(5),
            auto: false,
        }
    }

    fn challenge(checkins: Vec<CheckIn>) -> Challenge {
        Challenge {
            id: Id::from_string("ch-1"),
            name: "No dining out".to_string(),
            scope: ChallengeScope::Category(Category::Dining),
            start_date: day(3),
            duration_days: 7,
            estimated_daily_saving: Decimal::from(3),
            hacks: vec![],
            checkins,
            best_streak: 0,
        }
    }

    #[test]
    fn current_streak_ends_yesterday_when_today_open() {
        let checkins = vec![done(3), done(4), done(5)];
        assert_eq!(current_streak(&checkins, day(6)), 3);
        assert_eq!(current_streak(&checkins, day(5)), 3);
        // Gap on the 6th.
        assert_eq!(current_streak(&checkins, day(7)), 0);
    }

    #[test]
    fn current_streak_is_zero_after_miss_today() {
        let checkins = vec![done(3), done(4), missed(5)];
        assert_eq!(current_streak(&checkins, day(5)), 0);
        assert_eq!(current_streak(&checkins, day(6)), 0);
    }

    #[test]
    fn longest_streak_spans_history() {
        let checkins = vec![done(3), missed(4), done(5), done(6), done(7), done(9)];
        assert_eq!(longest_streak(&checkins), 3);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn progress_counts_and_status() {
        let c = challenge(vec![done(3), missed(4), done(5)]);
        let p = progress(&c, day(6));
        assert_eq!(p.status, ChallengeStatus::Active);
        assert_eq!(p.days_done, 2);
        assert_eq!(p.days_missed, 1);
        assert_eq!(p.total_saved, Decimal::from(11));
        assert_eq!(p.total_penalties, Decimal::from(5));
        assert_eq!(p.current_streak, 1);
        assert_eq!(p.best_streak, 1);
        assert_eq!(p.completion_percent, 28);
        assert_eq!(p.days_remaining, 4);

        assert_eq!(progress(&c, day(1)).status, ChallengeStatus::Upcoming);
        assert_eq!(progress(&c, day(1)).days_remaining, 7);
        assert_eq!(progress(&c, day(20)).status, ChallengeStatus::Completed);
        assert_eq!(progress(&c, day(20)).days_remaining, 0);
    }

    #[test]
    fn progress_reports_stored_best_when_higher() {
        let mut c = challenge(vec![done(3)]);
        c.best_streak = 6;
        assert_eq!(progress(&c, day(4)).best_streak, 6);
    }

    #[test]
    fn calendar_states() {
        let c = challenge(vec![done(3), missed(4)]);
        let cells = calendar(&c, day(2), day(10), day(5));
        let states: Vec<DayState> = cells.iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            vec![
                DayState::Rest,
                DayState::Done,
                DayState::Missed,
                DayState::Today,
                DayState::Pending,
                DayState::Pending,
                DayState::Pending,
                DayState::Pending,
                DayState::Rest,
            ]
        );
        assert_eq!(cells[1].saved, Some(Decimal::from(3)));
        assert_eq!(cells[0].saved, None);
    }
}
