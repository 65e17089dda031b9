/// Admin capability lookups
///
/// Admin membership is a per-request lookup, never cached in process
/// state. Handlers resolve it once per request and pass the result down.
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;

/// Check whether a user holds the admin capability.
pub async fn is_admin(pool: &PgPool, user_id: Uuid) -> Result<bool> {
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM admins WHERE user_id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<bool, _>(0))
}
