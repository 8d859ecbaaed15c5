//! Repository for the `user_streaks` table.

use chrono::NaiveDate;
use learnloop_core::streak::StreakState;
use learnloop_core::types::DbId;
use sqlx::PgPool;

use crate::models::streak::UserStreak;

/// Column list for `user_streaks` queries.
const COLUMNS: &str = "id, user_id, current_streak, longest_streak, last_activity_date, \
     total_active_days, streak_freezes, created_at, updated_at";

/// Provides read/write operations for streak records.
pub struct StreakRepo;

impl StreakRepo {
    /// Fetch a user's streak record, creating the zeroed default row on
    /// first touch.
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<UserStreak, sqlx::Error> {
        sqlx::query("INSERT INTO user_streaks (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM user_streaks WHERE user_id = $1");
        sqlx::query_as::<_, UserStreak>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Persist the outcome of a state-machine transition.
    pub async fn save_state(
        pool: &PgPool,
        user_id: DbId,
        state: &StreakState,
    ) -> Result<UserStreak, sqlx::Error> {
        let query = format!(
            "UPDATE user_streaks \
             SET current_streak = $2, longest_streak = $3, last_activity_date = $4, \
                 total_active_days = $5, streak_freezes = $6, updated_at = NOW() \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserStreak>(&query)
            .bind(user_id)
            .bind(state.current_streak)
            .bind(state.longest_streak)
            .bind(state.last_activity_date)
            .bind(state.total_active_days)
            .bind(state.streak_freezes)
            .fetch_one(pool)
            .await
    }

    /// Atomically grant freezes. Returns `None` when the user has no streak
    /// record yet.
    pub async fn add_freezes(
        pool: &PgPool,
        user_id: DbId,
        amount: i32,
    ) -> Result<Option<UserStreak>, sqlx::Error> {
        let query = format!(
            "UPDATE user_streaks \
             SET streak_freezes = streak_freezes + $2, updated_at = NOW() \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserStreak>(&query)
            .bind(user_id)
            .bind(amount)
            .fetch_optional(pool)
            .await
    }

    /// Streaks that lapsed with no freeze to save them: still counting,
    /// last active strictly before yesterday, zero freezes banked.
    pub async fn list_lapsed(
        pool: &PgPool,
        yesterday: NaiveDate,
    ) -> Result<Vec<UserStreak>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_streaks \
             WHERE current_streak > 0 \
               AND streak_freezes = 0 \
               AND last_activity_date < $1"
        );
        sqlx::query_as::<_, UserStreak>(&query)
            .bind(yesterday)
            .fetch_all(pool)
            .await
    }

    /// Zero out a lapsed streak, returning the value it held before the
    /// reset. Atomic: the row is locked while the old value is captured.
    pub async fn reset_streak(pool: &PgPool, id: DbId) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE user_streaks AS s \
             SET current_streak = 0, updated_at = NOW() \
             FROM (SELECT id, current_streak FROM user_streaks WHERE id = $1 FOR UPDATE) old \
             WHERE s.id = old.id AND old.current_streak > 0 \
             RETURNING old.current_streak",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
