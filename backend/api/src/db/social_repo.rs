/// Social graph repository (follow edges)
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::UserSummary;

pub struct SocialRepository;

impl SocialRepository {
    /// Create a follow relationship.
    pub async fn follow(pool: &PgPool, follower_id: Uuid, followed_id: Uuid) -> Result<()> {
        if follower_id == followed_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followed_id, created_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (follower_id, followed_id) DO NOTHING",
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create follow: {}", e);
            AppError::Internal(format!("Failed to create follow relationship: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::BadRequest(
                "Already following this user".to_string(),
            ));
        }

        Ok(())
    }

    /// Remove a follow relationship. Removing an absent edge is a no-op.
    pub async fn unfollow(pool: &PgPool, follower_id: Uuid, followed_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower_id)
            .bind(followed_id)
            .execute(pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete follow: {}", e);
                AppError::Internal(format!("Failed to remove follow relationship: {}", e))
            })?;

        Ok(())
    }

    /// Check if user A follows user B.
    pub async fn is_following(pool: &PgPool, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check follow status: {}", e);
            AppError::Internal(format!("Failed to check follow status: {}", e))
        })?;

        Ok(result.get::<bool, _>(0))
    }

    /// Followers of a user, newest edge first.
    pub async fn get_followers(pool: &PgPool, user_id: Uuid) -> Result<Vec<UserSummary>> {
        let followers = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.username, u.profile_picture
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.followed_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(followers)
    }

    /// Users a user follows, newest edge first.
    pub async fn get_following(pool: &PgPool, user_id: Uuid) -> Result<Vec<UserSummary>> {
        let following = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.username, u.profile_picture
            FROM follows f
            JOIN users u ON u.id = f.followed_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(following)
    }

    /// Followers count for a user.
    pub async fn get_followers_count(pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let result = sqlx::query("SELECT COUNT(*) FROM follows WHERE followed_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(result.get::<i64, _>(0))
    }

    /// Following count for a user.
    pub async fn get_following_count(pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let result = sqlx::query("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(result.get::<i64, _>(0))
    }
}
