//! Knowledge-check exam rules: category/difficulty vocabulary, question-type
//! answer comparison, pool selection, and grading.
//!
//! The API layer fetches question rows and applies these rules; every counter
//! update (`times_used`, `correct_rate`) happens in SQL so concurrent
//! submissions never lose increments.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Pass threshold: 60% of achievable points, rounded up.
pub fn passing_score(total_points: i32) -> i32 {
    // Equivalent to `(total_points * 60).div_ceil(100)`; spelled out because
    // this toolchain gates `div_ceil` behind the unstable `int_roundings`
    // feature.
    let scaled = total_points * 60;
    let quotient = scaled / 100;
    if scaled % 100 > 0 {
        quotient + 1
    } else {
        quotient
    }
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Closed set of question categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Rust,
    Web,
    Databases,
    Algorithms,
    Devops,
    General,
}

impl Category {
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "rust" => Ok(Self::Rust),
            "web" => Ok(Self::Web),
            "databases" => Ok(Self::Databases),
            "algorithms" => Ok(Self::Algorithms),
            "devops" => Ok(Self::Devops),
            "general" => Ok(Self::General),
            other => Err(CoreError::Validation(format!(
                "unknown question category: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Web => "web",
            Self::Databases => "databases",
            Self::Algorithms => "algorithms",
            Self::Devops => "devops",
            Self::General => "general",
        }
    }
}

/// Requested exam difficulty. `Mixed` is a request-only value meaning "do not
/// filter by difficulty"; stored questions carry one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Mixed,
}

impl Difficulty {
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "mixed" => Ok(Self::Mixed),
            other => Err(CoreError::Validation(format!(
                "unknown difficulty: {other}"
            ))),
        }
    }

    /// The stored value to filter by, or `None` for `Mixed`.
    pub fn filter_value(&self) -> Option<&'static str> {
        match self {
            Self::Beginner => Some("beginner"),
            Self::Intermediate => Some("intermediate"),
            Self::Advanced => Some("advanced"),
            Self::Mixed => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Question types and answer comparison
// ---------------------------------------------------------------------------

/// Question type, each variant carrying its own comparison rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    FillBlank,
    /// Code submissions need the execution sandbox; this grading path cannot
    /// score them and flags the answer as ungraded instead.
    Code,
}

impl QuestionType {
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "multiple_choice" => Ok(Self::MultipleChoice),
            "true_false" => Ok(Self::TrueFalse),
            "short_answer" => Ok(Self::ShortAnswer),
            "fill_blank" => Ok(Self::FillBlank),
            "code" => Ok(Self::Code),
            other => Err(CoreError::Validation(format!(
                "unknown question type: {other}"
            ))),
        }
    }

    /// Compare a submitted answer against the stored correct answer.
    pub fn check(&self, correct: &str, given: Option<&str>) -> Verdict {
        if matches!(self, Self::Code) {
            return Verdict::Ungraded;
        }
        let Some(given) = given else {
            return Verdict::Incorrect;
        };
        let matched = match self {
            Self::ShortAnswer => given.trim().eq_ignore_ascii_case(correct.trim()),
            _ => given.trim() == correct.trim(),
        };
        if matched {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }
}

// ---------------------------------------------------------------------------
// Pool selection
// ---------------------------------------------------------------------------

/// Pick the questions for one exam instance.
///
/// `primary` is the category/difficulty pool ordered by ascending usage;
/// `topup` holds same-category questions of any difficulty, already excluding
/// ids present in `primary`. The combined pool is shuffled and the first
/// `count` taken -- a short pool yields a short exam, never an error, as long
/// as at least one question exists.
pub fn select_questions<T, R: Rng + ?Sized>(
    primary: Vec<T>,
    topup: Vec<T>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<T>, CoreError> {
    let mut pool: Vec<T> = primary;
    pool.extend(topup);
    if pool.is_empty() {
        return Err(CoreError::NoQuestionsAvailable);
    }
    pool.shuffle(rng);
    pool.truncate(count);
    Ok(pool)
}

// ---------------------------------------------------------------------------
// Grading
// ---------------------------------------------------------------------------

/// The subset of a question row the grader needs. Built server-side from
/// re-fetched rows; client-supplied correctness is never trusted.
#[derive(Debug, Clone)]
pub struct GradableQuestion {
    pub id: DbId,
    pub question_type: QuestionType,
    pub correct_answer: String,
    pub points: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Excluded from both score and achievable points.
    Ungraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswer {
    pub question_id: DbId,
    pub verdict: Verdict,
    pub points_awarded: i32,
}

/// Outcome of grading one submission.
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub score: i32,
    pub correct_count: usize,
    /// Achievable points over gradable questions only.
    pub graded_total_points: i32,
    pub passing_score: i32,
    pub passed: bool,
    pub answers: Vec<GradedAnswer>,
    /// Question ids this path could not grade (code questions).
    pub ungraded_question_ids: Vec<DbId>,
}

/// Grade a submission against re-fetched questions.
///
/// `answer_for` maps a question id to the submitted answer, if any; a missing
/// answer for a gradable question counts as incorrect. Ungraded questions are
/// removed from both the numerator and the denominator, and an exam with no
/// gradable points never passes.
pub fn grade<'a, F>(questions: &[GradableQuestion], answer_for: F) -> GradeReport
where
    F: Fn(DbId) -> Option<&'a str>,
{
    let mut score = 0;
    let mut correct_count = 0;
    let mut graded_total = 0;
    let mut answers = Vec::with_capacity(questions.len());
    let mut ungraded = Vec::new();

    for q in questions {
        let verdict = q.question_type.check(&q.correct_answer, answer_for(q.id));
        let points_awarded = match verdict {
            Verdict::Correct => {
                score += q.points;
                correct_count += 1;
                graded_total += q.points;
                q.points
            }
            Verdict::Incorrect => {
                graded_total += q.points;
                0
            }
            Verdict::Ungraded => {
                ungraded.push(q.id);
                0
            }
        };
        answers.push(GradedAnswer {
            question_id: q.id,
            verdict,
            points_awarded,
        });
    }

    let passing = passing_score(graded_total);
    GradeReport {
        score,
        correct_count,
        graded_total_points: graded_total,
        passing_score: passing,
        passed: graded_total > 0 && score >= passing,
        answers,
        ungraded_question_ids: ungraded,
    }
}

/// Running-average correct rate, weighted by prior usage.
///
/// Mirror of the SQL expression in `QuestionRepo::record_answer`; kept here
/// so the formula is unit-testable.
pub fn updated_correct_rate(old_rate: f64, times_used: i32, correct: bool) -> f64 {
    let outcome = if correct { 100.0 } else { 0.0 };
    if times_used > 0 {
        ((old_rate * f64::from(times_used - 1)) + outcome) / f64::from(times_used)
    } else {
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn q(id: DbId, qt: QuestionType, correct: &str, points: i32) -> GradableQuestion {
        GradableQuestion {
            id,
            question_type: qt,
            correct_answer: correct.to_string(),
            points,
        }
    }

    #[test]
    fn category_parsing_is_case_insensitive_and_closed() {
        assert_eq!(Category::parse("Rust").unwrap(), Category::Rust);
        assert_eq!(Category::parse(" DEVOPS ").unwrap(), Category::Devops);
        assert_matches!(Category::parse("knitting"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn difficulty_mixed_means_no_filter() {
        assert_eq!(Difficulty::parse("mixed").unwrap().filter_value(), None);
        assert_eq!(
            Difficulty::parse("Beginner").unwrap().filter_value(),
            Some("beginner")
        );
        assert_matches!(Difficulty::parse("hard"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn passing_score_is_sixty_percent_rounded_up() {
        assert_eq!(passing_score(10), 6);
        assert_eq!(passing_score(7), 5); // 4.2 rounds up
        assert_eq!(passing_score(1), 1);
        assert_eq!(passing_score(0), 0);
    }

    #[test]
    fn multiple_choice_requires_exact_match() {
        let qt = QuestionType::MultipleChoice;
        assert_eq!(qt.check("b", Some(" b ")), Verdict::Correct);
        assert_eq!(qt.check("b", Some("B")), Verdict::Incorrect);
        assert_eq!(qt.check("b", None), Verdict::Incorrect);
    }

    #[test]
    fn short_answer_ignores_case_and_whitespace() {
        let qt = QuestionType::ShortAnswer;
        assert_eq!(qt.check("Borrow Checker", Some("  borrow checker ")), Verdict::Correct);
        assert_eq!(qt.check("Borrow Checker", Some("borrowing")), Verdict::Incorrect);
    }

    #[test]
    fn code_questions_are_never_silently_scored() {
        let qt = QuestionType::Code;
        assert_eq!(qt.check("fn main() {}", Some("fn main() {}")), Verdict::Ungraded);
        assert_eq!(qt.check("fn main() {}", None), Verdict::Ungraded);
    }

    #[test]
    fn select_questions_errors_only_on_empty_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let empty: Vec<i32> = vec![];
        assert_matches!(
            select_questions(empty.clone(), empty, 10, &mut rng),
            Err(CoreError::NoQuestionsAvailable)
        );
    }

    #[test]
    fn short_pool_returns_all_without_duplication() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_questions(vec![1, 2, 3], vec![], 10, &mut rng).unwrap();
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[test]
    fn selection_caps_at_requested_count() {
        let mut rng = StdRng::seed_from_u64(42);
        let picked = select_questions((0..20).collect(), (20..30).collect(), 5, &mut rng).unwrap();
        assert_eq!(picked.len(), 5);
    }

    #[test]
    fn all_correct_submission_scores_full_and_passes() {
        let questions = vec![
            q(1, QuestionType::MultipleChoice, "a", 2),
            q(2, QuestionType::TrueFalse, "true", 1),
            q(3, QuestionType::ShortAnswer, "ownership", 3),
        ];
        let answers = |id: DbId| match id {
            1 => Some("a"),
            2 => Some("true"),
            3 => Some("Ownership"),
            _ => None,
        };
        let report = grade(&questions, answers);
        assert_eq!(report.score, 6);
        assert_eq!(report.correct_count, 3);
        assert_eq!(report.graded_total_points, 6);
        assert!(report.passed);
    }

    #[test]
    fn all_incorrect_submission_fails() {
        let questions = vec![
            q(1, QuestionType::MultipleChoice, "a", 2),
            q(2, QuestionType::TrueFalse, "true", 1),
        ];
        let report = grade(&questions, |_| Some("wrong"));
        assert_eq!(report.score, 0);
        assert_eq!(report.correct_count, 0);
        assert!(!report.passed);
    }

    #[test]
    fn code_questions_excluded_from_both_sides_of_the_ratio() {
        let questions = vec![
            q(1, QuestionType::MultipleChoice, "a", 2),
            q(2, QuestionType::Code, "fn main() {}", 10),
        ];
        let report = grade(&questions, |id| (id == 1).then_some("a"));
        assert_eq!(report.graded_total_points, 2);
        assert_eq!(report.score, 2);
        assert_eq!(report.ungraded_question_ids, vec![2]);
        assert!(report.passed);
    }

    #[test]
    fn all_code_exam_never_passes() {
        let questions = vec![q(1, QuestionType::Code, "x", 5)];
        let report = grade(&questions, |_| Some("x"));
        assert_eq!(report.graded_total_points, 0);
        assert!(!report.passed);
    }

    #[test]
    fn correct_rate_running_average() {
        // First use: rate is the outcome itself.
        assert_eq!(updated_correct_rate(0.0, 0, true), 100.0);
        assert_eq!(updated_correct_rate(50.0, 0, false), 0.0);
        // times_used = 1: prior weight is zero.
        assert_eq!(updated_correct_rate(40.0, 1, true), 100.0);
        // Three prior uses at 100%, fourth answer wrong: 75%.
        assert_eq!(updated_correct_rate(100.0, 4, false), 75.0);
    }
}
