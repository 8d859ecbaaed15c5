//! Daily-activity streak state machine.
//!
//! All transitions are pure functions over [`StreakState`]; persistence and
//! notification side effects live in the API layer. Dates are calendar dates
//! (no time component) -- a streak day is a UTC calendar day with at least one
//! recorded learning activity.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;

/// Streak milestones that produce a `streak-milestone` notification when the
/// current streak first reaches them.
pub const MILESTONES: &[i32] = &[7, 14, 30, 60, 100, 365];

/// Per-user streak counters. Mirrors the mutable fields of the
/// `user_streaks` row; the db crate owns the row identity and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreakState {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub total_active_days: i32,
    pub streak_freezes: i32,
}

/// Which branch an [`advance`] call took, so callers can pick notifications
/// without re-deriving the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Already active today; nothing changed.
    NoChange,
    /// First-ever recorded activity.
    Started,
    /// Consecutive day; streak extended.
    Extended,
    /// A gap was bridged by consuming one streak freeze.
    BridgedWithFreeze,
    /// A gap with no freeze available; streak reset to 1.
    Reset,
}

/// Result of advancing the state machine for one day of activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    pub transition: Transition,
    pub state: StreakState,
}

/// Record one day of activity.
///
/// Idempotent per calendar day: advancing twice with the same `today` is a
/// no-op on the second call. Maintains `longest_streak >= current_streak`
/// and increments `total_active_days` on every non-no-op branch.
pub fn advance(state: &StreakState, today: NaiveDate) -> AdvanceOutcome {
    let mut next = state.clone();

    let transition = match state.last_activity_date {
        Some(last) if last == today => Transition::NoChange,
        None => {
            next.current_streak = 1;
            next.total_active_days = 1;
            Transition::Started
        }
        Some(last) if is_yesterday(last, today) => {
            next.current_streak += 1;
            next.total_active_days += 1;
            Transition::Extended
        }
        Some(_) if state.streak_freezes > 0 => {
            // The freeze bridges the gap: the streak continues as if no day
            // had been missed.
            next.streak_freezes -= 1;
            next.current_streak += 1;
            next.total_active_days += 1;
            Transition::BridgedWithFreeze
        }
        Some(_) => {
            next.current_streak = 1;
            next.total_active_days += 1;
            Transition::Reset
        }
    };

    if transition != Transition::NoChange {
        next.last_activity_date = Some(today);
        next.longest_streak = next.longest_streak.max(next.current_streak);
    }

    AdvanceOutcome {
        transition,
        state: next,
    }
}

/// Explicitly spend a freeze to cover yesterday's missed day.
///
/// Only permitted when a freeze is banked and the streak has actually
/// lapsed (`last_activity_date` strictly before yesterday). Sets
/// `last_activity_date` to yesterday without incrementing `current_streak`,
/// pre-empting the lapse that the next [`advance`] would otherwise see.
pub fn use_freeze(state: &StreakState, today: NaiveDate) -> Result<StreakState, CoreError> {
    if state.streak_freezes <= 0 {
        return Err(CoreError::NoFreezeAvailable);
    }

    let yesterday = yesterday(today);
    match state.last_activity_date {
        None => Err(CoreError::FreezeNotNeeded("no streak to protect")),
        Some(last) if last >= yesterday => {
            Err(CoreError::FreezeNotNeeded("streak is not lapsed"))
        }
        Some(_) => {
            let mut next = state.clone();
            next.streak_freezes -= 1;
            next.last_activity_date = Some(yesterday);
            Ok(next)
        }
    }
}

/// Administratively grant `amount` freezes (`amount >= 1`).
pub fn award_freezes(state: &StreakState, amount: i32) -> Result<StreakState, CoreError> {
    if amount < 1 {
        return Err(CoreError::Validation(
            "freeze amount must be at least 1".into(),
        ));
    }
    let mut next = state.clone();
    next.streak_freezes += amount;
    Ok(next)
}

/// The milestone crossed by moving from `before` to `after`, if any.
pub fn milestone_reached(before: i32, after: i32) -> Option<i32> {
    MILESTONES
        .iter()
        .copied()
        .find(|m| before < *m && after >= *m)
}

fn yesterday(today: NaiveDate) -> NaiveDate {
    today.pred_opt().expect("date out of range")
}

fn is_yesterday(last: NaiveDate, today: NaiveDate) -> bool {
    last == yesterday(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(
        current: i32,
        longest: i32,
        last: Option<NaiveDate>,
        total: i32,
        freezes: i32,
    ) -> StreakState {
        StreakState {
            current_streak: current,
            longest_streak: longest,
            last_activity_date: last,
            total_active_days: total,
            streak_freezes: freezes,
        }
    }

    #[test]
    fn first_activity_starts_streak_at_one() {
        let out = advance(&StreakState::default(), date(2024, 1, 15));
        assert_eq!(out.transition, Transition::Started);
        assert_eq!(out.state.current_streak, 1);
        assert_eq!(out.state.longest_streak, 1);
        assert_eq!(out.state.total_active_days, 1);
        assert_eq!(out.state.last_activity_date, Some(date(2024, 1, 15)));
    }

    #[test]
    fn advancing_twice_same_day_is_idempotent() {
        let first = advance(&StreakState::default(), date(2024, 1, 15));
        let second = advance(&first.state, date(2024, 1, 15));
        assert_eq!(second.transition, Transition::NoChange);
        assert_eq!(second.state, first.state);
    }

    #[test]
    fn consecutive_day_extends_streak() {
        let s = state(3, 5, Some(date(2024, 1, 14)), 10, 0);
        let out = advance(&s, date(2024, 1, 15));
        assert_eq!(out.transition, Transition::Extended);
        assert_eq!(out.state.current_streak, 4);
        assert_eq!(out.state.longest_streak, 5);
        assert_eq!(out.state.total_active_days, 11);
    }

    #[test]
    fn extending_past_longest_updates_longest() {
        let s = state(5, 5, Some(date(2024, 1, 14)), 5, 0);
        let out = advance(&s, date(2024, 1, 15));
        assert_eq!(out.state.current_streak, 6);
        assert_eq!(out.state.longest_streak, 6);
    }

    #[test]
    fn gap_without_freeze_resets_to_one() {
        // Streak 5, two-day gap, no freezes banked.
        let s = state(5, 5, Some(date(2024, 1, 1)), 20, 0);
        let out = advance(&s, date(2024, 1, 3));
        assert_eq!(out.transition, Transition::Reset);
        assert_eq!(out.state.current_streak, 1);
        assert_eq!(out.state.longest_streak, 5);
        assert_eq!(out.state.total_active_days, 21);
        assert_eq!(out.state.last_activity_date, Some(date(2024, 1, 3)));
    }

    #[test]
    fn gap_with_freeze_bridges_and_extends() {
        // Same gap, but one freeze banked: streak 5 becomes 6.
        let s = state(5, 5, Some(date(2024, 1, 1)), 20, 1);
        let out = advance(&s, date(2024, 1, 3));
        assert_eq!(out.transition, Transition::BridgedWithFreeze);
        assert_eq!(out.state.current_streak, 6);
        assert_eq!(out.state.longest_streak, 6);
        assert_eq!(out.state.streak_freezes, 0);
        assert_eq!(out.state.total_active_days, 21);
    }

    #[test]
    fn gap_consumes_exactly_one_freeze() {
        let s = state(2, 4, Some(date(2024, 3, 1)), 8, 2);
        let out = advance(&s, date(2024, 3, 5));
        assert_eq!(out.state.streak_freezes, 1);
        assert_eq!(out.state.current_streak, 3);
    }

    #[test]
    fn invariants_hold_across_transitions() {
        let days = [
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 2), // duplicate day
            date(2024, 1, 5), // gap, no freeze
            date(2024, 1, 6),
        ];
        let mut s = StreakState::default();
        for day in days {
            s = advance(&s, day).state;
            assert!(s.longest_streak >= s.current_streak);
            assert!(s.total_active_days >= s.current_streak);
        }
        assert_eq!(s.current_streak, 2);
        assert_eq!(s.longest_streak, 2);
        assert_eq!(s.total_active_days, 4);
    }

    #[test]
    fn use_freeze_requires_banked_freeze() {
        let s = state(3, 3, Some(date(2024, 1, 1)), 3, 0);
        assert_matches!(
            use_freeze(&s, date(2024, 1, 5)),
            Err(CoreError::NoFreezeAvailable)
        );
    }

    #[test]
    fn use_freeze_rejected_when_streak_alive() {
        // Active yesterday: the streak is still intact.
        let s = state(3, 3, Some(date(2024, 1, 4)), 3, 1);
        assert_matches!(
            use_freeze(&s, date(2024, 1, 5)),
            Err(CoreError::FreezeNotNeeded(_))
        );
        // Active today.
        let s = state(3, 3, Some(date(2024, 1, 5)), 3, 1);
        assert_matches!(
            use_freeze(&s, date(2024, 1, 5)),
            Err(CoreError::FreezeNotNeeded(_))
        );
    }

    #[test]
    fn use_freeze_backdates_to_yesterday_without_increment() {
        let s = state(4, 6, Some(date(2024, 1, 1)), 12, 2);
        let next = use_freeze(&s, date(2024, 1, 5)).unwrap();
        assert_eq!(next.streak_freezes, 1);
        assert_eq!(next.current_streak, 4);
        assert_eq!(next.last_activity_date, Some(date(2024, 1, 4)));
        // Today's activity now reads as consecutive -- the freeze
        // pre-empted the lapse path.
        let out = advance(&next, date(2024, 1, 5));
        assert_eq!(out.transition, Transition::Extended);
        assert_eq!(out.state.current_streak, 5);
    }

    #[test]
    fn use_freeze_rejected_for_never_active_user() {
        let s = state(0, 0, None, 0, 1);
        assert_matches!(
            use_freeze(&s, date(2024, 1, 5)),
            Err(CoreError::FreezeNotNeeded(_))
        );
    }

    #[test]
    fn award_freezes_validates_amount() {
        let s = StreakState::default();
        assert_matches!(award_freezes(&s, 0), Err(CoreError::Validation(_)));
        assert_eq!(award_freezes(&s, 3).unwrap().streak_freezes, 3);
    }

    #[test]
    fn milestone_fires_only_on_crossing() {
        assert_eq!(milestone_reached(6, 7), Some(7));
        assert_eq!(milestone_reached(7, 8), None);
        assert_eq!(milestone_reached(0, 1), None);
        assert_eq!(milestone_reached(29, 30), Some(30));
        // A freeze bridge can jump past a threshold.
        assert_eq!(milestone_reached(13, 14), Some(14));
    }
}
