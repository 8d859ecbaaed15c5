//! Repository for the `study_reminders` table.

use chrono::NaiveTime;
use learnloop_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::reminder::{DueReminder, StudyReminder};

/// Column list for `study_reminders` queries.
const COLUMNS: &str = "id, user_id, title, message, reminder_time, days_of_week, is_active, \
     send_email, last_sent_at, course_id, created_at, updated_at";

/// Provides CRUD for reminder definitions plus the dispatcher's due-scan.
pub struct ReminderRepo;

impl ReminderRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        title: &str,
        message: Option<&str>,
        reminder_time: NaiveTime,
        days_of_week: &[i16],
        send_email: bool,
        course_id: Option<DbId>,
    ) -> Result<StudyReminder, sqlx::Error> {
        let query = format!(
            "INSERT INTO study_reminders \
                 (user_id, title, message, reminder_time, days_of_week, send_email, course_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudyReminder>(&query)
            .bind(user_id)
            .bind(title)
            .bind(message)
            .bind(reminder_time)
            .bind(days_of_week)
            .bind(send_email)
            .bind(course_id)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<StudyReminder>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM study_reminders \
             WHERE user_id = $1 \
             ORDER BY reminder_time"
        );
        sqlx::query_as::<_, StudyReminder>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Fetch one reminder scoped to its owner.
    pub async fn get_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<StudyReminder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM study_reminders WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, StudyReminder>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Partial update; absent fields keep their current values. `COALESCE`
    /// cannot distinguish absent from null, so nullable fields are not
    /// clearable through this path (see `UpdateReminder`).
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        title: Option<&str>,
        message: Option<&str>,
        reminder_time: Option<NaiveTime>,
        days_of_week: Option<&[i16]>,
        is_active: Option<bool>,
        send_email: Option<bool>,
        course_id: Option<DbId>,
    ) -> Result<Option<StudyReminder>, sqlx::Error> {
        let query = format!(
            "UPDATE study_reminders \
             SET title = COALESCE($3, title), \
                 message = COALESCE($4, message), \
                 reminder_time = COALESCE($5, reminder_time), \
                 days_of_week = COALESCE($6, days_of_week), \
                 is_active = COALESCE($7, is_active), \
                 send_email = COALESCE($8, send_email), \
                 course_id = COALESCE($9, course_id), \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudyReminder>(&query)
            .bind(id)
            .bind(user_id)
            .bind(title)
            .bind(message)
            .bind(reminder_time)
            .bind(days_of_week)
            .bind(is_active)
            .bind(send_email)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a reminder scoped to its owner. Returns `true` if a row went.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM study_reminders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active reminders scheduled for exactly this minute, joined with the
    /// owner's delivery fields. Weekday and same-day filters are applied by
    /// the dispatcher.
    pub async fn list_due(
        pool: &PgPool,
        time: NaiveTime,
    ) -> Result<Vec<DueReminder>, sqlx::Error> {
        sqlx::query_as::<_, DueReminder>(
            "SELECT r.id, r.user_id, r.title, r.message, r.days_of_week, r.send_email, \
                    r.last_sent_at, r.course_id, u.email, u.email_reminders_enabled \
             FROM study_reminders r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.is_active AND u.is_active AND r.reminder_time = $1",
        )
        .bind(time)
        .fetch_all(pool)
        .await
    }

    /// Stamp a reminder as sent.
    pub async fn stamp_sent(pool: &PgPool, id: DbId, at: Timestamp) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE study_reminders SET last_sent_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(pool)
            .await?;
        Ok(())
    }
}
