//! Streak entity model.

use chrono::NaiveDate;
use learnloop_core::streak::StreakState;
use learnloop_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_streaks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserStreak {
    pub id: DbId,
    pub user_id: DbId,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub total_active_days: i32,
    pub streak_freezes: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserStreak {
    /// The pure state-machine view of this row.
    pub fn state(&self) -> StreakState {
        StreakState {
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_activity_date: self.last_activity_date,
            total_active_days: self.total_active_days,
            streak_freezes: self.streak_freezes,
        }
    }
}
