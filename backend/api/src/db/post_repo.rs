/// Post repository: shout CRUD, feed candidate batches and like-set
/// maintenance.
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{FeedPost, FeedPostRow, Post};

/// Create a new shout.
pub async fn create_post(
    pool: &PgPool,
    author_id: Uuid,
    content: &str,
    is_followers_only: bool,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (author_id, content, is_followers_only)
        VALUES ($1, $2, $3)
        RETURNING id, author_id, content, is_followers_only, created_at
        "#,
    )
    .bind(author_id)
    .bind(content)
    .bind(is_followers_only)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

/// Find a post by id.
pub async fn find_post_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, author_id, content, is_followers_only, created_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// Delete a post. Likes go with it via the foreign key.
pub async fn delete_post(pool: &PgPool, post_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Flip the followers-only flag; returns the updated post.
pub async fn set_privacy(
    pool: &PgPool,
    post_id: Uuid,
    is_followers_only: bool,
) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET is_followers_only = $2
        WHERE id = $1
        RETURNING id, author_id, content, is_followers_only, created_at
        "#,
    )
    .bind(post_id)
    .bind(is_followers_only)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// One candidate batch for the global feed: newest first, author and like
/// set attached.
pub async fn feed_batch(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FeedPostRow>(
        r#"
        SELECT p.id, p.content, p.is_followers_only, p.created_at,
               u.id AS author_id, u.name AS author_name,
               u.username AS author_username,
               u.profile_picture AS author_profile_picture,
               COALESCE(array_agg(l.user_id) FILTER (WHERE l.user_id IS NOT NULL),
                        ARRAY[]::uuid[]) AS likes
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_likes l ON l.post_id = p.id
        GROUP BY p.id, u.id
        ORDER BY p.created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(FeedPost::from).collect())
}

/// Most recent posts authored by anyone the user follows.
pub async fn posts_by_followed(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FeedPostRow>(
        r#"
        SELECT p.id, p.content, p.is_followers_only, p.created_at,
               u.id AS author_id, u.name AS author_name,
               u.username AS author_username,
               u.profile_picture AS author_profile_picture,
               COALESCE(array_agg(l.user_id) FILTER (WHERE l.user_id IS NOT NULL),
                        ARRAY[]::uuid[]) AS likes
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_likes l ON l.post_id = p.id
        WHERE p.author_id IN (
            SELECT followed_id FROM follows WHERE follower_id = $1
        )
        GROUP BY p.id, u.id
        ORDER BY p.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(FeedPost::from).collect())
}

/// All posts by one author, newest first.
pub async fn posts_by_author(
    pool: &PgPool,
    author_id: Uuid,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FeedPostRow>(
        r#"
        SELECT p.id, p.content, p.is_followers_only, p.created_at,
               u.id AS author_id, u.name AS author_name,
               u.username AS author_username,
               u.profile_picture AS author_profile_picture,
               COALESCE(array_agg(l.user_id) FILTER (WHERE l.user_id IS NOT NULL),
                        ARRAY[]::uuid[]) AS likes
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_likes l ON l.post_id = p.id
        WHERE p.author_id = $1
        GROUP BY p.id, u.id
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(author_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(FeedPost::from).collect())
}

/// The author's single newest post, regardless of visibility flags.
pub async fn latest_by_author(
    pool: &PgPool,
    author_id: Uuid,
) -> Result<Option<FeedPost>, sqlx::Error> {
    let row = sqlx::query_as::<_, FeedPostRow>(
        r#"
        SELECT p.id, p.content, p.is_followers_only, p.created_at,
               u.id AS author_id, u.name AS author_name,
               u.username AS author_username,
               u.profile_picture AS author_profile_picture,
               COALESCE(array_agg(l.user_id) FILTER (WHERE l.user_id IS NOT NULL),
                        ARRAY[]::uuid[]) AS likes
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_likes l ON l.post_id = p.id
        WHERE p.author_id = $1
        GROUP BY p.id, u.id
        ORDER BY p.created_at DESC
        LIMIT 1
        "#,
    )
    .bind(author_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(FeedPost::from))
}

/// Public posts created at or after the window start; top-shout
/// candidates for the global scope.
pub async fn public_posts_since(
    pool: &PgPool,
    window_start: DateTime<Utc>,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FeedPostRow>(
        r#"
        SELECT p.id, p.content, p.is_followers_only, p.created_at,
               u.id AS author_id, u.name AS author_name,
               u.username AS author_username,
               u.profile_picture AS author_profile_picture,
               COALESCE(array_agg(l.user_id) FILTER (WHERE l.user_id IS NOT NULL),
                        ARRAY[]::uuid[]) AS likes
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_likes l ON l.post_id = p.id
        WHERE p.is_followers_only = FALSE
          AND p.created_at >= $1
        GROUP BY p.id, u.id
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(window_start)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(FeedPost::from).collect())
}

/// Public posts by one author, no time window; top-shout candidates for
/// the per-author scope.
pub async fn public_posts_by_author(
    pool: &PgPool,
    author_id: Uuid,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FeedPostRow>(
        r#"
        SELECT p.id, p.content, p.is_followers_only, p.created_at,
               u.id AS author_id, u.name AS author_name,
               u.username AS author_username,
               u.profile_picture AS author_profile_picture,
               COALESCE(array_agg(l.user_id) FILTER (WHERE l.user_id IS NOT NULL),
                        ARRAY[]::uuid[]) AS likes
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_likes l ON l.post_id = p.id
        WHERE p.author_id = $1
          AND p.is_followers_only = FALSE
        GROUP BY p.id, u.id
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(author_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(FeedPost::from).collect())
}

/// Check whether a user currently likes a post.
pub async fn has_liked(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        "SELECT EXISTS(SELECT 1 FROM post_likes WHERE post_id = $1 AND user_id = $2)",
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<bool, _>(0))
}

/// Add a like. The composite key keeps repeats harmless.
pub async fn add_like(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO post_likes (post_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (post_id, user_id) DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a like.
pub async fn remove_like(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Current like count for a post.
pub async fn like_count(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>(0))
}
