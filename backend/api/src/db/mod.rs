/// Database access layer
///
/// One repository module per collection; all queries go through the
/// shared `PgPool`.
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

pub mod admin_repo;
pub mod car_repo;
pub mod post_repo;
pub mod social_repo;
pub mod user_repo;

pub use social_repo::SocialRepository;

/// Create the connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}
