//! Handlers for the `/streak` resource.
//!
//! Thin adapters over the pure state machine in `learnloop_core::streak`:
//! load the row, run the transition, persist, emit notifications.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use learnloop_core::error::CoreError;
use learnloop_core::streak::{self, Transition};
use learnloop_core::types::DbId;
use learnloop_db::models::notification::NotificationKind;
use learnloop_db::models::streak::UserStreak;
use learnloop_db::repositories::{NotificationRepo, StreakRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload for streak mutations.
#[derive(Debug, Serialize)]
pub struct StreakUpdateResponse {
    pub streak: UserStreak,
    pub transition: Transition,
    /// Milestone crossed by this update, if any.
    pub milestone: Option<i32>,
}

/// GET /api/v1/streak
///
/// The authenticated user's streak record, created lazily on first read.
pub async fn get_streak(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserStreak>>> {
    let row = StreakRepo::get_or_create(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: row }))
}

/// POST /api/v1/streak/update
///
/// Record today's learning activity. Idempotent per calendar day.
pub async fn update_streak(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<StreakUpdateResponse>>> {
    let row = StreakRepo::get_or_create(&state.pool, auth.user_id).await?;
    let today = Utc::now().date_naive();
    let outcome = streak::advance(&row.state(), today);

    if outcome.transition == Transition::NoChange {
        return Ok(Json(DataResponse {
            data: StreakUpdateResponse {
                streak: row,
                transition: outcome.transition,
                milestone: None,
            },
        }));
    }

    let saved = StreakRepo::save_state(&state.pool, auth.user_id, &outcome.state).await?;

    let milestone = streak::milestone_reached(row.current_streak, saved.current_streak);
    if let Some(days) = milestone {
        NotificationRepo::create(
            &state.pool,
            auth.user_id,
            NotificationKind::StreakMilestone,
            &format!("{days}-day streak!"),
            &format!("You've kept your learning streak alive for {days} days. Keep it up!"),
            serde_json::json!({ "milestone": days, "current_streak": saved.current_streak }),
        )
        .await?;
    }

    Ok(Json(DataResponse {
        data: StreakUpdateResponse {
            streak: saved,
            transition: outcome.transition,
            milestone,
        },
    }))
}

/// POST /api/v1/streak/use-freeze
///
/// Spend a banked freeze to cover yesterday's missed day. Fails with 409
/// when no freeze is banked or the streak is not actually lapsed.
pub async fn use_freeze(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserStreak>>> {
    let row = StreakRepo::get_or_create(&state.pool, auth.user_id).await?;
    let today = Utc::now().date_naive();
    let next = streak::use_freeze(&row.state(), today)?;
    let saved = StreakRepo::save_state(&state.pool, auth.user_id, &next).await?;
    Ok(Json(DataResponse { data: saved }))
}

/// Body for the admin freeze-award endpoint.
#[derive(Debug, Deserialize)]
pub struct AwardFreezes {
    pub amount: i32,
}

/// POST /api/v1/admin/streak/{user_id}/freezes
///
/// Grant streak freezes to a user. Admin only; 404 when the user has no
/// streak record yet.
pub async fn award_freezes(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<AwardFreezes>,
) -> AppResult<Json<DataResponse<UserStreak>>> {
    auth.require_admin()?;

    if input.amount < 1 {
        return Err(CoreError::Validation("freeze amount must be at least 1".into()).into());
    }

    let row = StreakRepo::add_freezes(&state.pool, user_id, input.amount)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "StreakRecord",
            id: user_id,
        })?;

    tracing::info!(
        admin_id = auth.user_id,
        user_id,
        amount = input.amount,
        "Streak freezes awarded"
    );
    Ok(Json(DataResponse { data: row }))
}
