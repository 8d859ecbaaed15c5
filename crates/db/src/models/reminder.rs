//! Study reminder entity model and DTOs.

use chrono::NaiveTime;
use learnloop_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `study_reminders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudyReminder {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub message: Option<String>,
    pub reminder_time: NaiveTime,
    /// 0 = Sunday .. 6 = Saturday.
    pub days_of_week: Vec<i16>,
    pub is_active: bool,
    pub send_email: bool,
    pub last_sent_at: Option<Timestamp>,
    pub course_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A due reminder joined with the owner's delivery fields, as returned by
/// `ReminderRepo::list_due`.
#[derive(Debug, Clone, FromRow)]
pub struct DueReminder {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub message: Option<String>,
    pub days_of_week: Vec<i16>,
    pub send_email: bool,
    pub last_sent_at: Option<Timestamp>,
    pub course_id: Option<DbId>,
    pub email: String,
    pub email_reminders_enabled: bool,
}

/// DTO for creating a reminder.
#[derive(Debug, Deserialize)]
pub struct CreateReminder {
    pub title: String,
    pub message: Option<String>,
    /// `HH:MM`, minute precision.
    pub reminder_time: String,
    pub days_of_week: Vec<i16>,
    pub send_email: Option<bool>,
    pub course_id: Option<DbId>,
}

/// DTO for updating a reminder. All fields are optional; absent fields keep
/// their current values. Because absent and null are not distinguished,
/// `message` and `course_id` cannot be cleared once set -- delete and
/// recreate the reminder to drop them.
#[derive(Debug, Deserialize)]
pub struct UpdateReminder {
    pub title: Option<String>,
    pub message: Option<String>,
    pub reminder_time: Option<String>,
    pub days_of_week: Option<Vec<i16>>,
    pub is_active: Option<bool>,
    pub send_email: Option<bool>,
    pub course_id: Option<DbId>,
}
