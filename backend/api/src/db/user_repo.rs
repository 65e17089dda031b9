/// User repository: accounts, search, dream cars, admin roster.
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{AdminRosterEntry, DreamCar, User, UserSummary};

const USER_COLUMNS: &str = "id, member_no, username, email, password_hash, name, bio, \
                            profile_picture, created_at";

/// Insert a new user row.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    name: &str,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, email, password_hash, name)
        VALUES ($1, $2, $3, $4)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Login lookup: the identifier may be a username or an email address.
pub async fn find_by_identifier(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1"
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<bool, _>(0))
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<bool, _>(0))
}

/// Uniqueness check for renames: is the username held by someone else?
pub async fn username_taken_by_other(
    pool: &PgPool,
    username: &str,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id <> $2)")
        .bind(username)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<bool, _>(0))
}

pub async fn update_username(
    pool: &PgPool,
    user_id: Uuid,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET username = $2
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Case-insensitive search across name, username and email, capped.
pub async fn search(pool: &PgPool, query: &str, limit: i64) -> Result<Vec<User>, sqlx::Error> {
    let pattern = format!("%{}%", query);

    let users = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE name ILIKE $1 OR username ILIKE $1 OR email ILIKE $1
        ORDER BY created_at DESC
        LIMIT $2
        "#
    ))
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Public summaries for a set of users in one round trip.
pub async fn summaries_by_ids(
    pool: &PgPool,
    user_ids: &[Uuid],
) -> Result<Vec<UserSummary>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, name, username, profile_picture FROM users WHERE id = ANY($1)",
    )
    .bind(user_ids)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Newest members that have a profile picture set.
pub async fn recent_with_photos(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, name, username, profile_picture
        FROM users
        WHERE profile_picture IS NOT NULL
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// The user's dream-car list, or None when the user does not exist.
pub async fn dream_cars(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<Vec<DreamCar>>, sqlx::Error> {
    let row = sqlx::query("SELECT dream_cars FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let value: serde_json::Value = row.get(0);
    let cars = serde_json::from_value(value).unwrap_or_default();
    Ok(Some(cars))
}

pub async fn set_dream_cars(
    pool: &PgPool,
    user_id: Uuid,
    cars: &[DreamCar],
) -> Result<(), sqlx::Error> {
    let value = serde_json::to_value(cars).unwrap_or_else(|_| serde_json::Value::Array(vec![]));

    sqlx::query("UPDATE users SET dream_cars = $2 WHERE id = $1")
        .bind(user_id)
        .bind(value)
        .execute(pool)
        .await?;

    Ok(())
}

/// Paginated roster for the admin console, with per-user aggregate
/// counts, oldest account first.
pub async fn admin_roster(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<AdminRosterEntry>, sqlx::Error> {
    let entries = sqlx::query_as::<_, AdminRosterEntry>(
        r#"
        SELECT u.id, u.username, u.name, u.email, u.bio, u.profile_picture, u.created_at,
               (SELECT COUNT(*) FROM posts p WHERE p.author_id = u.id) AS post_count,
               (SELECT COUNT(*) FROM follows f WHERE f.followed_id = u.id) AS follower_count,
               (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_count
        FROM users u
        ORDER BY u.created_at ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn count_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) FROM users").fetch_one(pool).await?;
    Ok(row.get::<i64, _>(0))
}
