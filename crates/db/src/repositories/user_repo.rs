//! Repository for the `users` table.

use learnloop_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, username, email, is_active, notifications_enabled, \
     email_reminders_enabled, created_at, updated_at";

/// Read access to the user fields the engine consumes.
pub struct UserRepo;

impl UserRepo {
    pub async fn get_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
