//! Handlers for dynamic exam assembly and grading.
//!
//! Assembled exams are ephemeral: the instance lives only in the response,
//! and grading re-derives everything from resubmitted question ids against
//! server-side rows. Correct answers never leave the server
//! ([`QuestionPublic`] strips them at the type level).

use std::collections::{HashMap, HashSet};

use axum::extract::State;
use axum::Json;
use learnloop_core::error::CoreError;
use learnloop_core::exam::{self, Category, Difficulty, GradeReport, Verdict};
use learnloop_core::types::DbId;
use learnloop_db::models::notification::NotificationKind;
use learnloop_db::models::question::{Question, QuestionPublic};
use learnloop_db::repositories::{NotificationRepo, QuestionRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default number of questions per exam.
const DEFAULT_QUESTION_COUNT: usize = 10;

/// Hard cap on questions per exam.
const MAX_QUESTION_COUNT: usize = 50;

/// Default time limit in minutes.
const DEFAULT_TIME_LIMIT_MINS: i32 = 15;

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// Body for `POST /exams/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateExam {
    pub category: String,
    pub difficulty: String,
    pub question_count: Option<usize>,
    pub time_limit_minutes: Option<i32>,
}

/// An assembled, answer-stripped exam instance. Never persisted.
#[derive(Debug, Serialize)]
pub struct DynamicExam {
    pub id: Uuid,
    pub category: Category,
    pub difficulty: Difficulty,
    pub questions: Vec<QuestionPublic>,
    pub total_points: i32,
    pub passing_score: i32,
    pub time_limit_minutes: i32,
}

/// POST /api/v1/exams/generate
///
/// Assemble an exam from the least-used active questions of a category,
/// topping up across difficulties when the primary pool runs short.
pub async fn generate_exam(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateExam>,
) -> AppResult<Json<DataResponse<DynamicExam>>> {
    let category = Category::parse(&input.category)?;
    let difficulty = Difficulty::parse(&input.difficulty)?;
    let count = input
        .question_count
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT);
    let time_limit = input.time_limit_minutes.unwrap_or(DEFAULT_TIME_LIMIT_MINS);
    if time_limit < 1 {
        return Err(CoreError::Validation("time limit must be at least 1 minute".into()).into());
    }

    let primary = QuestionRepo::pool_for(
        &state.pool,
        category.as_str(),
        difficulty.filter_value(),
        count as i64,
    )
    .await?;

    let topup = if primary.len() < count {
        let selected_ids: Vec<DbId> = primary.iter().map(|q| q.id).collect();
        QuestionRepo::topup_for(
            &state.pool,
            category.as_str(),
            &selected_ids,
            (count - primary.len()) as i64,
        )
        .await?
    } else {
        Vec::new()
    };

    // Scoped so the thread-local rng is dropped before the next await.
    let selected = {
        let mut rng = rand::rng();
        exam::select_questions(primary, topup, count, &mut rng)?
    };

    let ids: Vec<DbId> = selected.iter().map(|q| q.id).collect();
    let total_points: i32 = selected.iter().map(|q| q.points).sum();
    QuestionRepo::increment_usage(&state.pool, &ids).await?;

    let instance = DynamicExam {
        id: Uuid::new_v4(),
        category,
        difficulty,
        total_points,
        passing_score: exam::passing_score(total_points),
        time_limit_minutes: time_limit,
        questions: selected.into_iter().map(QuestionPublic::from).collect(),
    };

    tracing::info!(
        user_id = auth.user_id,
        exam_id = %instance.id,
        question_count = instance.questions.len(),
        "Dynamic exam assembled"
    );
    Ok(Json(DataResponse { data: instance }))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// Body for `POST /exams/submit-dynamic`. Answers are keyed by question id.
#[derive(Debug, Deserialize)]
pub struct SubmitDynamicExam {
    pub question_ids: Vec<DbId>,
    pub answers: HashMap<DbId, String>,
}

/// The first submitted id with no matching row, if any. Grading covers every
/// submitted question or none of them -- a partial fetch must not shrink the
/// denominator or touch question statistics.
fn first_missing_id(requested: &[DbId], fetched: &[Question]) -> Option<DbId> {
    let found: HashSet<DbId> = fetched.iter().map(|q| q.id).collect();
    requested.iter().copied().find(|id| !found.contains(id))
}

/// POST /api/v1/exams/submit-dynamic
///
/// Grade a dynamic exam submission. Questions are re-fetched by id; every
/// submitted id must exist, and client-supplied correctness is never
/// trusted. Code-type questions are reported as ungraded and excluded from
/// the pass/fail computation.
pub async fn submit_dynamic_exam(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitDynamicExam>,
) -> AppResult<Json<DataResponse<GradeReport>>> {
    if input.question_ids.is_empty() {
        return Err(CoreError::Validation("question_ids must not be empty".into()).into());
    }

    let mut seen = HashSet::new();
    let ids: Vec<DbId> = input
        .question_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let questions = QuestionRepo::fetch_by_ids(&state.pool, &ids).await?;
    if let Some(missing) = first_missing_id(&ids, &questions) {
        return Err(CoreError::NotFound {
            entity: "Question",
            id: missing,
        }
        .into());
    }

    let gradable = questions
        .iter()
        .map(|q| q.gradable())
        .collect::<Result<Vec<_>, _>>()?;

    let report = exam::grade(&gradable, |id| input.answers.get(&id).map(String::as_str));

    // Fold each gradable outcome into the per-question statistics. A failed
    // stat update must not void the user's result.
    for answer in &report.answers {
        let correct = match answer.verdict {
            Verdict::Correct => true,
            Verdict::Incorrect => false,
            Verdict::Ungraded => continue,
        };
        if let Err(e) = QuestionRepo::record_answer(&state.pool, answer.question_id, correct).await
        {
            tracing::error!(
                question_id = answer.question_id,
                error = %e,
                "Failed to update question statistics"
            );
        }
    }

    let verdict_text = if report.passed { "passed" } else { "did not pass" };
    let message = format!(
        "You {verdict_text} with {} of {} points.",
        report.score, report.graded_total_points
    );
    NotificationRepo::create(
        &state.pool,
        auth.user_id,
        NotificationKind::ExamResult,
        "Exam graded",
        &message,
        serde_json::json!({
            "score": report.score,
            "total_points": report.graded_total_points,
            "passed": report.passed,
            "correct_count": report.correct_count,
        }),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        score = report.score,
        passed = report.passed,
        ungraded = report.ungraded_question_ids.len(),
        "Dynamic exam graded"
    );
    Ok(Json(DataResponse { data: report }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn question(id: DbId) -> Question {
        Question {
            id,
            category: "rust".into(),
            difficulty: "beginner".into(),
            question_type: "true_false".into(),
            prompt: "Does the borrow checker run at compile time?".into(),
            options: None,
            correct_answer: "true".into(),
            points: 1,
            is_active: true,
            times_used: 0,
            correct_rate: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn submission_with_an_unknown_id_is_rejected_whole() {
        // One of two ids has no row: the absent one must surface instead of
        // grading the survivor against a shrunken denominator.
        let fetched = vec![question(1)];
        assert_eq!(first_missing_id(&[1, 999], &fetched), Some(999));
        assert_eq!(first_missing_id(&[1], &fetched), None);
    }

    #[test]
    fn empty_fetch_reports_the_first_requested_id() {
        assert_eq!(first_missing_id(&[5, 6], &[]), Some(5));
    }
}
