/// User handlers: profiles, search, follows, dream cars, owned cars and
/// the admin console.
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{CarWithOwners, CatalogCar, DreamCar};
use crate::services::cars::new_car_from_catalog;
use crate::services::{CarService, PostService, UserService};

#[derive(Debug, Deserialize)]
pub struct UserSearchParams {
    pub name: Option<String>,
}

/// GET /api/users/search?name=
#[get("/search")]
pub async fn search_users(
    query: web::Query<UserSearchParams>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let users = UserService::new(pool.get_ref().clone())
        .search(query.name.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(users))
}

#[derive(Debug, Deserialize)]
pub struct CarSearchParams {
    pub q: Option<String>,
}

/// GET /api/users/search-cars?q=
#[get("/search-cars")]
pub async fn search_cars(
    query: web::Query<CarSearchParams>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) else {
        return Ok(HttpResponse::Ok().json(Vec::<CarWithOwners>::new()));
    };

    let cars = CarService::new(pool.get_ref().clone()).search(q, 3).await?;

    Ok(HttpResponse::Ok().json(cars))
}

/// GET /api/users/recent-with-photos
#[get("/recent-with-photos")]
pub async fn recent_users_with_photos(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let users = UserService::new(pool.get_ref().clone())
        .recent_with_photos()
        .await?;

    Ok(HttpResponse::Ok().json(users))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListParams {
    pub user_id: Option<String>,
    #[serde(default)]
    pub page: i64,
}

/// GET /api/users/admin/list?userId=&page=
#[get("/admin/list")]
pub async fn admin_list_users(
    query: web::Query<AdminListParams>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let raw = query
        .user_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    let requester =
        Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    let roster = UserService::new(pool.get_ref().clone())
        .admin_roster(requester, query.page.max(0))
        .await?;

    Ok(HttpResponse::Ok().json(roster))
}

/// GET /api/users/{userId}
#[get("/{user_id}")]
pub async fn get_user(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let profile = UserService::new(pool.get_ref().clone())
        .profile(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUsernameRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
}

/// PUT /api/users/{userId}/username
#[put("/{user_id}/username")]
pub async fn update_username(
    path: web::Path<Uuid>,
    req: web::Json<UpdateUsernameRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    req.validate()?;

    let user = UserService::new(pool.get_ref().clone())
        .rename(path.into_inner(), &req.username)
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPostsParams {
    pub viewer_id: Option<String>,
}

impl UserPostsParams {
    fn viewer(&self) -> Option<Uuid> {
        self.viewer_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }
}

/// GET /api/users/{userId}/posts?viewerId=
#[get("/{user_id}/posts")]
pub async fn get_user_posts(
    path: web::Path<Uuid>,
    query: web::Query<UserPostsParams>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let posts = PostService::new(pool.get_ref().clone())
        .user_posts(path.into_inner(), query.viewer())
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/users/{userId}/posts/recent
#[get("/{user_id}/posts/recent")]
pub async fn get_recent_post(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let post = PostService::new(pool.get_ref().clone())
        .latest_post(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/users/{userId}/top-shout
#[get("/{user_id}/top-shout")]
pub async fn get_user_top_shout(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let top = PostService::new(pool.get_ref().clone())
        .top_shout_for_user(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(top))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub follower_id: Uuid,
}

/// POST /api/users/{userId}/follow
#[post("/{user_id}/follow")]
pub async fn follow_user(
    path: web::Path<Uuid>,
    req: web::Json<FollowRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let profile = UserService::new(pool.get_ref().clone())
        .follow(path.into_inner(), req.follower_id)
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/users/{userId}/unfollow
#[post("/{user_id}/unfollow")]
pub async fn unfollow_user(
    path: web::Path<Uuid>,
    req: web::Json<FollowRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let profile = UserService::new(pool.get_ref().clone())
        .unfollow(path.into_inner(), req.follower_id)
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/users/{userId}/followers
#[get("/{user_id}/followers")]
pub async fn get_followers(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let followers = UserService::new(pool.get_ref().clone())
        .followers(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(followers))
}

/// GET /api/users/{userId}/following
#[get("/{user_id}/following")]
pub async fn get_following(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let following = UserService::new(pool.get_ref().clone())
        .following(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(following))
}

/// GET /api/users/{userId}/dream-cars
#[get("/{user_id}/dream-cars")]
pub async fn get_dream_cars(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let cars = UserService::new(pool.get_ref().clone())
        .dream_cars(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(cars))
}

#[derive(Debug, Deserialize)]
pub struct DreamCarRequest {
    pub car: DreamCar,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamCarResponse {
    pub dream_cars: Vec<DreamCar>,
    pub is_favorite: bool,
}

/// POST /api/users/{userId}/dream-cars
///
/// Toggles the car in the user's dream list.
#[post("/{user_id}/dream-cars")]
pub async fn toggle_dream_car(
    path: web::Path<Uuid>,
    req: web::Json<DreamCarRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let (dream_cars, is_favorite) = UserService::new(pool.get_ref().clone())
        .toggle_dream_car(path.into_inner(), req.into_inner().car)
        .await?;

    Ok(HttpResponse::Ok().json(DreamCarResponse {
        dream_cars,
        is_favorite,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCarsResponse {
    pub owned_cars: Vec<CarWithOwners>,
    pub is_favorite: bool,
}

/// GET /api/users/{userId}/owned-cars
#[get("/{user_id}/owned-cars")]
pub async fn get_owned_cars(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let cars = CarService::new(pool.get_ref().clone())
        .owned_cars_checked(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(cars))
}

#[derive(Debug, Deserialize)]
pub struct AddOwnedCarRequest {
    pub car: CatalogCar,
    pub description: Option<String>,
}

/// POST /api/users/{userId}/owned-cars
///
/// Catalogs the car with the caller as its first owner.
#[post("/{user_id}/owned-cars")]
pub async fn add_owned_car(
    path: web::Path<Uuid>,
    req: web::Json<AddOwnedCarRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let body = req.into_inner();
    let new_car = new_car_from_catalog(body.car, body.description);

    let owned_cars = CarService::new(pool.get_ref().clone())
        .add_owned_car(path.into_inner(), new_car)
        .await?;

    Ok(HttpResponse::Ok().json(OwnedCarsResponse {
        owned_cars,
        is_favorite: true,
    }))
}

/// DELETE /api/users/{userId}/owned-cars/{carId}
#[delete("/{user_id}/owned-cars/{car_id}")]
pub async fn remove_owned_car(
    path: web::Path<(Uuid, Uuid)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let (user_id, car_id) = path.into_inner();

    let owned_cars = CarService::new(pool.get_ref().clone())
        .remove_owned_car(user_id, car_id)
        .await?;

    Ok(HttpResponse::Ok().json(OwnedCarsResponse {
        owned_cars,
        is_favorite: false,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDetailsResponse {
    #[serde(flatten)]
    pub car: CarWithOwners,
    pub is_owner: bool,
}

/// GET /api/users/{userId}/owned-cars/{carId}
///
/// Anyone may view the car; the flag marks whether this user owns it.
#[get("/{user_id}/owned-cars/{car_id}")]
pub async fn get_owned_car(
    path: web::Path<(Uuid, Uuid)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let (user_id, car_id) = path.into_inner();

    let (car, is_owner) = CarService::new(pool.get_ref().clone())
        .car_details(car_id, Some(user_id))
        .await?;

    Ok(HttpResponse::Ok().json(CarDetailsResponse { car, is_owner }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheckResponse {
    pub is_admin: bool,
}

/// GET /api/users/{userId}/admin-check
#[get("/{user_id}/admin-check")]
pub async fn admin_check(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let is_admin = UserService::new(pool.get_ref().clone())
        .is_admin(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-store"))
        .json(AdminCheckResponse { is_admin }))
}
