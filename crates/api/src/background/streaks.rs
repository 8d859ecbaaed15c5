//! Nightly streak sweep (daily cadence).
//!
//! The state machine only runs when a user acts; streaks that lapse while
//! nobody logs in are discovered here. A streak is swept when it is still
//! counting, the last activity is older than yesterday, and no freeze is
//! banked to save it.

use chrono::NaiveDate;
use learnloop_db::models::notification::NotificationKind;
use learnloop_db::models::streak::UserStreak;
use learnloop_db::repositories::{NotificationRepo, StreakRepo, UserRepo};
use learnloop_db::DbPool;

use crate::email::EmailDelivery;

/// Reset all freeze-less lapsed streaks. Returns the number reset.
pub async fn sweep_lapsed(
    pool: &DbPool,
    email: Option<&EmailDelivery>,
    today: NaiveDate,
) -> Result<usize, sqlx::Error> {
    let yesterday = today.pred_opt().expect("date out of range");
    let lapsed = StreakRepo::list_lapsed(pool, yesterday).await?;

    let mut reset = 0;
    for row in lapsed {
        match break_streak(pool, email, &row).await {
            Ok(true) => reset += 1,
            Ok(false) => {} // raced with an advance; nothing to do
            Err(e) => {
                tracing::error!(
                    user_id = row.user_id,
                    error = %e,
                    "Failed to sweep lapsed streak"
                );
            }
        }
    }
    Ok(reset)
}

/// Reset one lapsed streak and notify its owner.
async fn break_streak(
    pool: &DbPool,
    email: Option<&EmailDelivery>,
    row: &UserStreak,
) -> Result<bool, sqlx::Error> {
    let Some(previous_streak) = StreakRepo::reset_streak(pool, row.id).await? else {
        return Ok(false);
    };

    let message = format!(
        "Your {previous_streak}-day streak has ended. Start a new one today!"
    );
    NotificationRepo::create(
        pool,
        row.user_id,
        NotificationKind::StreakBroken,
        "Streak lost",
        &message,
        serde_json::json!({ "previous_streak": previous_streak }),
    )
    .await?;

    if let Some(mailer) = email {
        if let Some(user) = UserRepo::get_by_id(pool, row.user_id).await? {
            if user.email_reminders_enabled {
                let html = format!(
                    "<h2>Your streak has ended</h2>\
                     <p>Your {previous_streak}-day learning streak lapsed. \
                     Jump back in today to start a new one.</p>"
                );
                if let Err(e) = mailer.send(&user.email, "Streak lost", &html).await {
                    tracing::warn!(
                        user_id = row.user_id,
                        error = %e,
                        "Streak-broken email failed; notification already recorded"
                    );
                }
            }
        }
    }

    tracing::debug!(
        user_id = row.user_id,
        previous_streak,
        "Lapsed streak reset"
    );
    Ok(true)
}
