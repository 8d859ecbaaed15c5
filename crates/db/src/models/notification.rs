//! Notification entity model.

use learnloop_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Closed set of notification kinds, stored as kebab-case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Reminder,
    ExamReady,
    StreakBroken,
    StreakMilestone,
    CourseCompleted,
    ExamResult,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reminder => "reminder",
            Self::ExamReady => "exam-ready",
            Self::StreakBroken => "streak-broken",
            Self::StreakMilestone => "streak-milestone",
            Self::CourseCompleted => "course-completed",
            Self::ExamResult => "exam-result",
            Self::System => "system",
        }
    }
}

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
