//! Repository for the `exams` table.

use learnloop_core::types::DbId;
use sqlx::PgPool;

use crate::models::exam::Exam;

/// Column list for `exams` queries.
const COLUMNS: &str = "id, course_id, title, is_published, time_limit_minutes, created_at, updated_at";

/// Read access to published exam metadata.
pub struct ExamRepo;

impl ExamRepo {
    /// The most recent published exam for a course, if any.
    pub async fn find_published_for_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Option<Exam>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exams \
             WHERE course_id = $1 AND is_published \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Exam>(&query)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }
}
