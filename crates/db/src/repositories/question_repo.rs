//! Repository for the `questions` table.

use learnloop_core::types::DbId;
use sqlx::PgPool;

use crate::models::question::Question;

/// Column list for `questions` queries.
const COLUMNS: &str = "id, category, difficulty, question_type, prompt, options, correct_answer, \
     points, is_active, times_used, correct_rate, created_at, updated_at";

/// Provides pool selection and statistics updates for exam questions.
pub struct QuestionRepo;

impl QuestionRepo {
    /// Active questions in a category, least-used first. `difficulty = None`
    /// means any difficulty (a `mixed` exam request).
    pub async fn pool_for(
        pool: &PgPool,
        category: &str,
        difficulty: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM questions \
             WHERE is_active AND category = $1 \
               AND ($2::text IS NULL OR difficulty = $2) \
             ORDER BY times_used ASC, id ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(category)
            .bind(difficulty)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Same-category questions of any difficulty, excluding ids already
    /// selected. Used to top up a short primary pool.
    pub async fn topup_for(
        pool: &PgPool,
        category: &str,
        exclude_ids: &[DbId],
        limit: i64,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM questions \
             WHERE is_active AND category = $1 \
               AND id <> ALL($2) \
             ORDER BY times_used ASC, id ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(category)
            .bind(exclude_ids)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Re-fetch questions by id for grading. Order is not significant.
    pub async fn fetch_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM questions WHERE id = ANY($1)");
        sqlx::query_as::<_, Question>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Atomically bump `times_used` for every selected question.
    pub async fn increment_usage(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE questions \
             SET times_used = times_used + 1, updated_at = NOW() \
             WHERE id = ANY($1)",
        )
        .bind(ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Fold one graded answer into the running correct rate, weighted by
    /// prior usage. Single-statement so concurrent submissions never lose an
    /// update. Mirrors `learnloop_core::exam::updated_correct_rate`.
    pub async fn record_answer(
        pool: &PgPool,
        id: DbId,
        correct: bool,
    ) -> Result<(), sqlx::Error> {
        let outcome: f64 = if correct { 100.0 } else { 0.0 };
        sqlx::query(
            "UPDATE questions \
             SET correct_rate = CASE \
                     WHEN times_used > 0 \
                     THEN ((correct_rate * (times_used - 1)) + $2) / times_used \
                     ELSE $2 \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(outcome)
        .execute(pool)
        .await?;
        Ok(())
    }
}
