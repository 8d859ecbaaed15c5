pub mod exams;
pub mod health;
pub mod notification;
pub mod reminders;
pub mod streak;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /streak                        get streak, update, use-freeze
/// /admin/streak/{user_id}/freezes  award freezes (admin only)
/// /reminders                     reminder CRUD
/// /exams/generate                assemble a dynamic exam
/// /exams/submit-dynamic          grade a submission
/// /notifications                 list, read, read-all, unread-count
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/streak", streak::router())
        .nest("/admin/streak", streak::admin_router())
        .nest("/reminders", reminders::router())
        .nest("/exams", exams::router())
        .nest("/notifications", notification::router())
}
