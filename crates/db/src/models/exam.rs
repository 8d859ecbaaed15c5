//! Published exam metadata.

use learnloop_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `exams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exam {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub is_published: bool,
    pub time_limit_minutes: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
