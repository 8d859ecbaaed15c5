use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No streak freeze available")]
    NoFreezeAvailable,

    #[error("Streak freeze not needed: {0}")]
    FreezeNotNeeded(&'static str),

    #[error("No questions available for the requested category")]
    NoQuestionsAvailable,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
