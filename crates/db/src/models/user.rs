//! User surface consumed by the engine: identity plus delivery preferences.

use learnloop_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub notifications_enabled: bool,
    pub email_reminders_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
