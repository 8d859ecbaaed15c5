//! Background scheduler for the engagement jobs.
//!
//! [`Scheduler`] owns its spawned task handles and a [`CancellationToken`];
//! nothing runs before [`Scheduler::start`] and no global job registry
//! exists. Three independent cadences, all UTC:
//!
//! - every minute: reminder dispatch ([`reminders`])
//! - daily at the configured hour: streak sweep ([`streaks`])
//! - twice daily at the configured hours: engagement nudges ([`engagement`])
//!
//! Overlap policy is skip-if-running: each loop awaits its handler before
//! computing the next wall-clock boundary, so a run that overshoots its
//! cadence swallows the missed ticks instead of stacking up. The reminder
//! dispatcher's same-day `last_sent_at` guard remains the idempotency
//! backstop. Per-run errors are logged and never stop the loop.

pub mod engagement;
pub mod reminders;
pub mod streaks;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Timelike, Utc};
use learnloop_db::DbPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::email::EmailDelivery;

/// How long [`Scheduler::stop`] waits for each loop to finish its current run.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the three recurring job loops.
pub struct Scheduler {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the job loops and return the running scheduler.
    pub fn start(
        pool: DbPool,
        email: Option<Arc<EmailDelivery>>,
        config: SchedulerConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let mut handles = Vec::with_capacity(3);

        handles.push(tokio::spawn(reminder_loop(
            pool.clone(),
            email.clone(),
            cancel.clone(),
        )));
        handles.push(tokio::spawn(sweep_loop(
            pool.clone(),
            email.clone(),
            config.sweep_hour,
            cancel.clone(),
        )));
        handles.push(tokio::spawn(engagement_loop(
            pool,
            email,
            config.engagement_hours,
            config.engagement_sample_rate,
            cancel.clone(),
        )));

        tracing::info!("Engagement scheduler started");
        Self { cancel, handles }
    }

    /// Cancel all loops. New ticks stop firing immediately; an
    /// already-executing run is given a bounded grace period, not interrupted.
    pub async fn stop(self) {
        self.cancel.cancel();
        for handle in self.handles {
            let _ = tokio::time::timeout(STOP_TIMEOUT, handle).await;
        }
        tracing::info!("Engagement scheduler stopped");
    }
}

/// Minute loop: dispatch due study reminders.
async fn reminder_loop(
    pool: DbPool,
    email: Option<Arc<EmailDelivery>>,
    cancel: CancellationToken,
) {
    loop {
        let wait = until_next_minute(Utc::now());
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reminder dispatcher stopping");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                let now = Utc::now();
                match reminders::dispatch_due(&pool, email.as_deref(), now).await {
                    Ok(sent) if sent > 0 => {
                        tracing::info!(sent, "Reminder dispatch completed");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Reminder dispatch failed");
                    }
                }
            }
        }
    }
}

/// Daily loop: reset freeze-less lapsed streaks.
async fn sweep_loop(
    pool: DbPool,
    email: Option<Arc<EmailDelivery>>,
    hour: u32,
    cancel: CancellationToken,
) {
    loop {
        let now = Utc::now();
        let wait = duration_until(now, next_at_hour(now, hour));
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Streak sweeper stopping");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                let today = Utc::now().date_naive();
                match streaks::sweep_lapsed(&pool, email.as_deref(), today).await {
                    Ok(reset) => {
                        if reset > 0 {
                            tracing::info!(reset, "Streak sweep completed");
                        } else {
                            tracing::debug!("Streak sweep: no lapsed streaks");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Streak sweep failed");
                    }
                }
            }
        }
    }
}

/// Twice-daily loop: nudge recently active learners toward an exam.
async fn engagement_loop(
    pool: DbPool,
    email: Option<Arc<EmailDelivery>>,
    hours: [u32; 2],
    sample_rate: f64,
    cancel: CancellationToken,
) {
    loop {
        let now = Utc::now();
        let wait = duration_until(now, next_of_hours(now, hours));
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Engagement trigger stopping");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                match engagement::nudge_recent_learners(&pool, email.as_deref(), sample_rate, Utc::now()).await {
                    Ok(nudged) => {
                        tracing::info!(nudged, "Engagement trigger completed");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Engagement trigger failed");
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wall-clock boundary math
// ---------------------------------------------------------------------------

/// Time to sleep until the next minute boundary strictly after `now`.
fn until_next_minute(now: DateTime<Utc>) -> Duration {
    let next = (now + chrono::Duration::minutes(1))
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .expect("minute truncation cannot fail");
    duration_until(now, next)
}

/// The next occurrence of `hour:00:00` UTC strictly after `now`.
fn next_at_hour(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let candidate = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .expect("valid hour");
    let candidate = Utc.from_utc_datetime(&candidate);
    if candidate > now {
        candidate
    } else {
        candidate + chrono::Duration::days(1)
    }
}

/// The earlier of the next occurrences of the two configured hours.
fn next_of_hours(now: DateTime<Utc>, hours: [u32; 2]) -> DateTime<Utc> {
    next_at_hour(now, hours[0]).min(next_at_hour(now, hours[1]))
}

fn duration_until(now: DateTime<Utc>, then: DateTime<Utc>) -> Duration {
    (then - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, h, m, s).unwrap()
    }

    #[test]
    fn next_minute_boundary_truncates_seconds() {
        assert_eq!(until_next_minute(at(9, 30, 15)), Duration::from_secs(45));
        // Exactly on a boundary: the next tick is a full minute away.
        assert_eq!(until_next_minute(at(9, 30, 0)), Duration::from_secs(60));
    }

    #[test]
    fn next_at_hour_rolls_over_to_tomorrow() {
        let now = at(10, 30, 0);
        assert_eq!(next_at_hour(now, 18), at(18, 0, 0));
        let midnight = next_at_hour(now, 0);
        assert_eq!(
            midnight,
            Utc.with_ymd_and_hms(2024, 5, 21, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_at_hour_is_strictly_in_the_future() {
        let now = at(18, 0, 0);
        assert_eq!(
            next_at_hour(now, 18),
            Utc.with_ymd_and_hms(2024, 5, 21, 18, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_of_hours_picks_the_earlier_occurrence() {
        assert_eq!(next_of_hours(at(8, 0, 0), [10, 18]), at(10, 0, 0));
        assert_eq!(next_of_hours(at(12, 0, 0), [10, 18]), at(18, 0, 0));
        // Past both: tomorrow's first slot.
        assert_eq!(
            next_of_hours(at(20, 0, 0), [10, 18]),
            Utc.with_ymd_and_hms(2024, 5, 21, 10, 0, 0).unwrap()
        );
    }
}
