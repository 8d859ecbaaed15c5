//! Pure domain logic for the learnloop engagement engine.
//!
//! This crate has zero internal dependencies so the streak state machine and
//! exam rules can be exercised by the API layer, background jobs, and tests
//! without touching a database.

pub mod error;
pub mod exam;
pub mod streak;
pub mod types;
