//! Route definitions for the `/streak` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::streak;
use crate::state::AppState;

/// Routes mounted at `/streak`.
///
/// ```text
/// GET    /             -> get_streak
/// POST   /update       -> update_streak
/// POST   /use-freeze   -> use_freeze
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(streak::get_streak))
        .route("/update", post(streak::update_streak))
        .route("/use-freeze", post(streak::use_freeze))
}

/// Admin routes mounted at `/admin/streak`.
///
/// ```text
/// POST   /{user_id}/freezes  -> award_freezes (admin only)
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/{user_id}/freezes", post(streak::award_freezes))
}
