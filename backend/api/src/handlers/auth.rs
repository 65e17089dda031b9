/// Registration and login handlers.
///
/// There is no session or token mechanism: login answers with the user
/// summary and clients pass explicit ids on subsequent requests.
use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::services::UserService;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address.
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: Uuid,
    pub member_no: i64,
    pub username: String,
    pub name: String,
    pub email: String,
}

/// POST /api/auth/register
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let user = UserService::new(pool.get_ref().clone())
        .register(&req.email, &req.password, &req.name)
        .await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_string(),
        username: user.username,
    }))
}

/// POST /api/auth/login
#[post("/login")]
pub async fn login(pool: web::Data<PgPool>, req: web::Json<LoginRequest>) -> Result<HttpResponse> {
    req.validate()?;

    let user = UserService::new(pool.get_ref().clone())
        .login(&req.username, &req.password)
        .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: user.id,
        member_no: user.member_no,
        username: user.username,
        name: user.name,
        email: user.email,
    }))
}
