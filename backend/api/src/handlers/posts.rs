/// Shout handlers: create, delete, privacy, likes, top shout.
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::PostService;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 500))]
    pub content: String,

    #[serde(default)]
    pub is_followers_only: bool,
}

/// POST /api/posts
#[post("")]
pub async fn create_post(
    pool: web::Data<PgPool>,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let post = PostService::new(pool.get_ref().clone())
        .create_shout(req.user_id, &req.content, req.is_followers_only)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// GET /api/posts/top-shout
///
/// The most-liked public shout of the trailing window.
#[get("/top-shout")]
pub async fn get_top_shout(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let top = PostService::new(pool.get_ref().clone())
        .top_shout_global(config.feed.top_shout_window_hours)
        .await?;

    Ok(HttpResponse::Ok().json(top))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostParams {
    pub user_id: Option<String>,
}

/// DELETE /api/posts/{postId}?userId=
#[delete("/{post_id}")]
pub async fn delete_post(
    path: web::Path<Uuid>,
    query: web::Query<DeletePostParams>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let raw = query
        .user_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| AppError::Validation("User ID is required".to_string()))?;
    let requester =
        Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    PostService::new(pool.get_ref().clone())
        .delete_post(path.into_inner(), requester)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post deleted successfully"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrivacyRequest {
    pub is_followers_only: bool,
}

/// PUT /api/posts/{postId}/privacy
#[put("/{post_id}/privacy")]
pub async fn update_privacy(
    path: web::Path<Uuid>,
    req: web::Json<UpdatePrivacyRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let post = PostService::new(pool.get_ref().clone())
        .set_privacy(path.into_inner(), req.is_followers_only)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: Uuid,
}

/// POST /api/posts/{postId}/like
#[post("/{post_id}/like")]
pub async fn like_post(
    path: web::Path<Uuid>,
    req: web::Json<LikeRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let status = PostService::new(pool.get_ref().clone())
        .toggle_like(path.into_inner(), req.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(status))
}
