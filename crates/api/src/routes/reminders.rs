//! Route definitions for the `/reminders` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::reminders;
use crate::state::AppState;

/// Routes mounted at `/reminders`.
///
/// ```text
/// GET    /        -> list_reminders
/// POST   /        -> create_reminder
/// GET    /{id}    -> get_reminder
/// PUT    /{id}    -> update_reminder
/// DELETE /{id}    -> delete_reminder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reminders::list_reminders))
        .route("/", post(reminders::create_reminder))
        .route("/{id}", get(reminders::get_reminder))
        .route("/{id}", put(reminders::update_reminder))
        .route("/{id}", delete(reminders::delete_reminder))
}
