//! Handlers for the `/reminders` resource.
//!
//! Reminder definitions are owned and edited by their user; the background
//! dispatcher only ever stamps `last_sent_at`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveTime;
use learnloop_core::error::CoreError;
use learnloop_core::types::DbId;
use learnloop_db::models::reminder::{CreateReminder, StudyReminder, UpdateReminder};
use learnloop_db::repositories::ReminderRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Parse an `HH:MM` time-of-day string.
fn parse_reminder_time(input: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(input, "%H:%M")
        .map_err(|_| CoreError::Validation(format!("invalid reminder time: {input}, expected HH:MM")))
}

/// Days must be non-empty and each in 0..=6 (0 = Sunday).
fn validate_days(days: &[i16]) -> Result<(), CoreError> {
    if days.is_empty() {
        return Err(CoreError::Validation("days_of_week must not be empty".into()));
    }
    if let Some(bad) = days.iter().find(|d| !(0..=6).contains(*d)) {
        return Err(CoreError::Validation(format!(
            "invalid day of week: {bad}, expected 0-6"
        )));
    }
    Ok(())
}

/// GET /api/v1/reminders
pub async fn list_reminders(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<StudyReminder>>>> {
    let reminders = ReminderRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: reminders }))
}

/// POST /api/v1/reminders
pub async fn create_reminder(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReminder>,
) -> AppResult<impl IntoResponse> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("title must not be empty".into()).into());
    }
    let time = parse_reminder_time(&input.reminder_time)?;
    validate_days(&input.days_of_week)?;

    let reminder = ReminderRepo::create(
        &state.pool,
        auth.user_id,
        title,
        input.message.as_deref(),
        time,
        &input.days_of_week,
        input.send_email.unwrap_or(false),
        input.course_id,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: reminder }),
    ))
}

/// GET /api/v1/reminders/{id}
pub async fn get_reminder(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StudyReminder>>> {
    let reminder = ReminderRepo::get_for_user(&state.pool, id, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Reminder",
            id,
        })?;
    Ok(Json(DataResponse { data: reminder }))
}

/// PUT /api/v1/reminders/{id}
pub async fn update_reminder(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReminder>,
) -> AppResult<Json<DataResponse<StudyReminder>>> {
    let time = input
        .reminder_time
        .as_deref()
        .map(parse_reminder_time)
        .transpose()?;
    if let Some(days) = &input.days_of_week {
        validate_days(days)?;
    }
    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()).into());
        }
    }

    let reminder = ReminderRepo::update(
        &state.pool,
        id,
        auth.user_id,
        input.title.as_deref().map(str::trim),
        input.message.as_deref(),
        time,
        input.days_of_week.as_deref(),
        input.is_active,
        input.send_email,
        input.course_id,
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Reminder",
        id,
    })?;

    Ok(Json(DataResponse { data: reminder }))
}

/// DELETE /api/v1/reminders/{id}
///
/// Returns 204 No Content on success, 404 if the reminder does not belong
/// to the authenticated user.
pub async fn delete_reminder(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = ReminderRepo::delete(&state.pool, id, auth.user_id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "Reminder",
            id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_minute_precision_times() {
        assert_eq!(
            parse_reminder_time("07:30").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert_matches!(parse_reminder_time("7:3pm"), Err(CoreError::Validation(_)));
        assert_matches!(parse_reminder_time("25:00"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_out_of_range_days() {
        assert!(validate_days(&[0, 6]).is_ok());
        assert_matches!(validate_days(&[]), Err(CoreError::Validation(_)));
        assert_matches!(validate_days(&[7]), Err(CoreError::Validation(_)));
        assert_matches!(validate_days(&[-1]), Err(CoreError::Validation(_)));
    }
}
