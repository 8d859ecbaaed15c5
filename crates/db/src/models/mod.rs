//! Row models and DTOs, one module per table group.

pub mod exam;
pub mod notification;
pub mod question;
pub mod reminder;
pub mod streak;
pub mod user;
