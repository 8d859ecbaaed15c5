//! Route definitions for the dynamic exam endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::exams;
use crate::state::AppState;

/// Routes mounted at `/exams`.
///
/// ```text
/// POST   /generate        -> generate_exam
/// POST   /submit-dynamic  -> submit_dynamic_exam
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(exams::generate_exam))
        .route("/submit-dynamic", post(exams::submit_dynamic_exam))
}
