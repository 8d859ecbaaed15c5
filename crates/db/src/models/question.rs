//! Question pool entity models.

use learnloop_core::exam::{GradableQuestion, QuestionType};
use learnloop_core::error::CoreError;
use learnloop_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full row from the `questions` table.
///
/// Contains the correct answer -- NEVER serialize this into an assembled
/// exam. Use [`QuestionPublic`] for anything leaving the server.
#[derive(Debug, Clone, FromRow)]
pub struct Question {
    pub id: DbId,
    pub category: String,
    pub difficulty: String,
    pub question_type: String,
    pub prompt: String,
    pub options: Option<serde_json::Value>,
    pub correct_answer: String,
    pub points: i32,
    pub is_active: bool,
    pub times_used: i32,
    pub correct_rate: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Question {
    /// The grading view of this row. A stored type string outside the closed
    /// set is a data integrity failure (the schema CHECK should make it
    /// impossible), not a caller mistake.
    pub fn gradable(&self) -> Result<GradableQuestion, CoreError> {
        let question_type = QuestionType::parse(&self.question_type).map_err(|_| {
            CoreError::Internal(format!(
                "question {} has invalid stored type: {}",
                self.id, self.question_type
            ))
        })?;
        Ok(GradableQuestion {
            id: self.id,
            question_type,
            correct_answer: self.correct_answer.clone(),
            points: self.points,
        })
    }
}

/// Answer-stripped question payload for assembled exams.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionPublic {
    pub id: DbId,
    pub category: String,
    pub difficulty: String,
    pub question_type: String,
    pub prompt: String,
    pub options: Option<serde_json::Value>,
    pub points: i32,
}

impl From<Question> for QuestionPublic {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            category: q.category,
            difficulty: q.difficulty,
            question_type: q.question_type,
            prompt: q.prompt,
            options: q.options,
            points: q.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn row() -> Question {
        Question {
            id: 7,
            category: "rust".into(),
            difficulty: "intermediate".into(),
            question_type: "multiple_choice".into(),
            prompt: "Which trait enables `for` loops?".into(),
            options: Some(serde_json::json!(["Iterator", "Display", "Clone"])),
            correct_answer: "Iterator".into(),
            points: 2,
            is_active: true,
            times_used: 3,
            correct_rate: 66.7,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn public_payload_never_carries_the_correct_answer() {
        let value = serde_json::to_value(QuestionPublic::from(row())).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("correct_answer"));
        // Sanity: the stripped payload still carries the fields clients need.
        assert!(object.contains_key("prompt"));
        assert!(object.contains_key("options"));
    }

    #[test]
    fn gradable_flags_an_out_of_set_type_as_integrity_failure() {
        let mut q = row();
        q.question_type = "essay".into();
        assert_matches!(q.gradable(), Err(CoreError::Internal(_)));
    }
}
