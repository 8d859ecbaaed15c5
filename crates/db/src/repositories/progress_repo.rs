//! Repository for the `course_progress` table.

use learnloop_core::types::{DbId, Timestamp};
use sqlx::PgPool;

/// Read access to recent course activity for the engagement sampler.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Distinct `(user_id, course_id)` pairs with completed progress since
    /// the cutoff.
    pub async fn recently_completed_pairs(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId)>(
            "SELECT DISTINCT user_id, course_id \
             FROM course_progress \
             WHERE completed_at >= $1",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
