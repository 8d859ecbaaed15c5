//! Exam nudges for recently active learners (twice-daily cadence).
//!
//! Samples roughly 10% of the `(user, course)` pairs with completed progress
//! in the trailing week -- an independent Bernoulli trial per pair, not per
//! user -- then invites each surviving user to one randomly chosen course's
//! published exam.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use learnloop_core::types::DbId;
use learnloop_db::models::notification::NotificationKind;
use learnloop_db::repositories::{ExamRepo, NotificationRepo, ProgressRepo, UserRepo};
use learnloop_db::DbPool;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::email::EmailDelivery;

/// How far back the sampler looks for completed progress.
const ACTIVITY_WINDOW_DAYS: i64 = 7;

/// Nudge sampled learners toward an exam. Returns the number notified.
pub async fn nudge_recent_learners(
    pool: &DbPool,
    email: Option<&EmailDelivery>,
    sample_rate: f64,
    now: DateTime<Utc>,
) -> Result<usize, sqlx::Error> {
    let since = now - chrono::Duration::days(ACTIVITY_WINDOW_DAYS);
    let pairs = ProgressRepo::recently_completed_pairs(pool, since).await?;

    // Scoped so the thread-local rng is dropped before the awaits below.
    let targets: Vec<(DbId, DbId)> = {
        let mut rng = rand::rng();
        sample_pairs(pairs, sample_rate, &mut rng)
            .into_iter()
            .filter_map(|(user_id, courses)| {
                courses.choose(&mut rng).map(|&course_id| (user_id, course_id))
            })
            .collect()
    };

    let mut nudged = 0;
    for (user_id, course_id) in targets {
        match nudge_user(pool, email, user_id, course_id).await {
            Ok(true) => nudged += 1,
            Ok(false) => {} // no published exam, or notifications disabled
            Err(e) => {
                tracing::error!(user_id, course_id, error = %e, "Failed to nudge user");
            }
        }
    }
    Ok(nudged)
}

/// Independent Bernoulli trial per pair, survivors grouped by user.
fn sample_pairs<R: Rng + ?Sized>(
    pairs: Vec<(DbId, DbId)>,
    sample_rate: f64,
    rng: &mut R,
) -> BTreeMap<DbId, Vec<DbId>> {
    let mut by_user: BTreeMap<DbId, Vec<DbId>> = BTreeMap::new();
    for (user_id, course_id) in pairs {
        if rng.random_bool(sample_rate) {
            by_user.entry(user_id).or_default().push(course_id);
        }
    }
    by_user
}

/// Invite one user to one course's published exam, if both exist and the
/// user wants notifications.
async fn nudge_user(
    pool: &DbPool,
    email: Option<&EmailDelivery>,
    user_id: DbId,
    course_id: DbId,
) -> Result<bool, sqlx::Error> {
    let Some(exam) = ExamRepo::find_published_for_course(pool, course_id).await? else {
        return Ok(false);
    };
    let Some(user) = UserRepo::get_by_id(pool, user_id).await? else {
        return Ok(false);
    };
    if !user.notifications_enabled {
        return Ok(false);
    }

    let message = format!(
        "You've been making progress -- test yourself with \"{}\"!",
        exam.title
    );
    NotificationRepo::create(
        pool,
        user_id,
        NotificationKind::ExamReady,
        "Ready for a knowledge check?",
        &message,
        serde_json::json!({ "exam_id": exam.id, "course_id": course_id }),
    )
    .await?;

    if user.email_reminders_enabled {
        if let Some(mailer) = email {
            let html = format!(
                "<h2>Ready for a knowledge check?</h2><p>{message}</p>"
            );
            if let Err(e) = mailer
                .send(&user.email, "Ready for a knowledge check?", &html)
                .await
            {
                tracing::warn!(user_id, error = %e, "Exam nudge email failed");
            }
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn full_rate_keeps_every_pair_grouped_by_user() {
        let mut rng = StdRng::seed_from_u64(1);
        let pairs = vec![(1, 10), (1, 11), (2, 10), (3, 12)];
        let sampled = sample_pairs(pairs, 1.0, &mut rng);
        assert_eq!(sampled.len(), 3);
        assert_eq!(sampled[&1], vec![10, 11]);
        assert_eq!(sampled[&2], vec![10]);
    }

    #[test]
    fn zero_rate_keeps_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let pairs = vec![(1, 10), (2, 11)];
        assert!(sample_pairs(pairs, 0.0, &mut rng).is_empty());
    }

    #[test]
    fn trials_are_per_pair_not_per_user() {
        // With a seeded rng and many pairs for one user, some pairs survive
        // and some do not -- the trial cannot be a single per-user coin flip.
        let mut rng = StdRng::seed_from_u64(7);
        let pairs: Vec<(DbId, DbId)> = (0..100).map(|c| (1, c)).collect();
        let sampled = sample_pairs(pairs, 0.5, &mut rng);
        let kept = sampled.get(&1).map_or(0, Vec::len);
        assert!(kept > 20 && kept < 80, "kept {kept} of 100 pairs");
    }
}
