/// Feed handlers.
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::FeedService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQueryParams {
    pub viewer_id: Option<String>,
    #[serde(default)]
    pub page: i64,
}

impl FeedQueryParams {
    /// Tolerant viewer parse: absent, empty or malformed ids read as an
    /// anonymous request rather than an error.
    fn viewer(&self) -> Option<Uuid> {
        self.viewer_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }
}

/// GET /api/feed?viewerId=&page=
#[get("")]
pub async fn get_feed(
    query: web::Query<FeedQueryParams>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let service = FeedService::new(pool.get_ref().clone(), config.feed.clone());
    let page = service.global_feed(query.viewer(), query.page.max(0)).await?;

    Ok(HttpResponse::Ok().json(page))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingFeedParams {
    pub user_id: Option<String>,
}

/// GET /api/feed/following?userId=
#[get("/following")]
pub async fn get_following_feed(
    query: web::Query<FollowingFeedParams>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let raw = query
        .user_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| AppError::Validation("User ID required".to_string()))?;
    let user_id =
        Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    let service = FeedService::new(pool.get_ref().clone(), config.feed.clone());
    let posts = service.following_feed(user_id).await?;

    Ok(HttpResponse::Ok().json(posts))
}
