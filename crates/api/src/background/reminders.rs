//! Study reminder dispatch (minute cadence).
//!
//! Loads reminders scheduled for the tick's HH:MM, filters by weekday and the
//! same-day idempotency guard, then inserts a notification and optionally
//! sends an email per match. One reminder's failure never stops the rest.

use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc};
use learnloop_core::types::Timestamp;
use learnloop_db::models::notification::NotificationKind;
use learnloop_db::models::reminder::DueReminder;
use learnloop_db::repositories::{NotificationRepo, ReminderRepo};
use learnloop_db::DbPool;

use crate::email::EmailDelivery;

/// Dispatch all reminders due at `now`'s minute. Returns the number sent.
pub async fn dispatch_due(
    pool: &DbPool,
    email: Option<&EmailDelivery>,
    now: DateTime<Utc>,
) -> Result<usize, sqlx::Error> {
    let minute = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0)
        .expect("tick time is always valid");
    let due = ReminderRepo::list_due(pool, minute).await?;

    let mut sent = 0;
    for reminder in due {
        if !fires_now(&reminder.days_of_week, reminder.last_sent_at, now) {
            continue;
        }
        match deliver(pool, email, &reminder, now).await {
            Ok(()) => sent += 1,
            Err(e) => {
                tracing::error!(
                    reminder_id = reminder.id,
                    user_id = reminder.user_id,
                    error = %e,
                    "Failed to deliver reminder"
                );
            }
        }
    }
    Ok(sent)
}

/// Weekday and same-day idempotency filter.
///
/// A reminder fires when today's weekday (0 = Sunday) is in its day set and
/// it has not already been sent on today's calendar date -- the latter keeps
/// restarts and overlapping ticks from double-sending.
fn fires_now(days_of_week: &[i16], last_sent_at: Option<Timestamp>, now: DateTime<Utc>) -> bool {
    let weekday = now.weekday().num_days_from_sunday() as i16;
    if !days_of_week.contains(&weekday) {
        return false;
    }
    !last_sent_at.is_some_and(|sent| sent.date_naive() == now.date_naive())
}

/// Insert the notification, send the optional email, stamp `last_sent_at`.
async fn deliver(
    pool: &DbPool,
    email: Option<&EmailDelivery>,
    reminder: &DueReminder,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let message = reminder
        .message
        .clone()
        .unwrap_or_else(|| "Time for your study session!".to_string());

    NotificationRepo::create(
        pool,
        reminder.user_id,
        NotificationKind::Reminder,
        &reminder.title,
        &message,
        serde_json::json!({
            "reminder_id": reminder.id,
            "course_id": reminder.course_id,
        }),
    )
    .await?;

    if reminder.send_email && reminder.email_reminders_enabled {
        if let Some(mailer) = email {
            let html = format!(
                "<h2>{}</h2><p>{}</p>",
                reminder.title, message
            );
            if let Err(e) = mailer.send(&reminder.email, &reminder.title, &html).await {
                tracing::warn!(
                    reminder_id = reminder.id,
                    error = %e,
                    "Reminder email failed; notification already recorded"
                );
            }
        }
    }

    ReminderRepo::stamp_sent(pool, reminder.id, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // 2024-05-20 is a Monday (weekday 1 counting from Sunday).
    fn monday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 7, 30, 0).unwrap()
    }

    #[test]
    fn fires_on_matching_weekday() {
        assert!(fires_now(&[1, 3, 5], None, monday_morning()));
    }

    #[test]
    fn skips_on_other_weekdays() {
        assert!(!fires_now(&[0, 6], None, monday_morning()));
    }

    #[test]
    fn same_day_guard_blocks_duplicate_sends() {
        let earlier_today = Utc.with_ymd_and_hms(2024, 5, 20, 7, 29, 0).unwrap();
        assert!(!fires_now(&[1], Some(earlier_today), monday_morning()));
    }

    #[test]
    fn sent_yesterday_fires_again() {
        let yesterday = Utc.with_ymd_and_hms(2024, 5, 19, 7, 30, 0).unwrap();
        assert!(fires_now(&[1], Some(yesterday), monday_morning()));
    }
}
