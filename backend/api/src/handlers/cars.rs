/// Car handlers: the external catalog proxy and shared car records.
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::services::catalog::CatalogQuery;
use crate::services::{CarService, CatalogClient};

/// GET /api/cars?year=&make=&model=&limit=
///
/// Proxy to the external car data API.
#[get("")]
pub async fn catalog_search(
    query: web::Query<CatalogQuery>,
    catalog: web::Data<CatalogClient>,
) -> Result<HttpResponse> {
    let cars = catalog.search(&query).await?;

    Ok(HttpResponse::Ok().json(cars))
}

/// GET /api/cars/{id}
#[get("/{id}")]
pub async fn get_car(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let (car, _) = CarService::new(pool.get_ref().clone())
        .car_details(path.into_inner(), None)
        .await?;

    Ok(HttpResponse::Ok().json(car))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCarRequest {
    pub description: String,
}

/// PATCH /api/cars/{id}
#[patch("/{id}")]
pub async fn update_car(
    path: web::Path<Uuid>,
    req: web::Json<UpdateCarRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let car = CarService::new(pool.get_ref().clone())
        .update_description(path.into_inner(), &req.description)
        .await?;

    Ok(HttpResponse::Ok().json(car))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOwnerRequest {
    pub new_owner_id: Uuid,
}

/// POST /api/cars/{id}/owners
#[post("/{id}/owners")]
pub async fn add_car_owner(
    path: web::Path<Uuid>,
    req: web::Json<AddOwnerRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let car = CarService::new(pool.get_ref().clone())
        .add_co_owner(path.into_inner(), req.new_owner_id)
        .await?;

    Ok(HttpResponse::Ok().json(car))
}

/// DELETE /api/cars/{id}/owners/{ownerId}
#[delete("/{id}/owners/{owner_id}")]
pub async fn remove_car_owner(
    path: web::Path<(Uuid, Uuid)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let (car_id, owner_id) = path.into_inner();

    match CarService::new(pool.get_ref().clone())
        .remove_co_owner(car_id, owner_id)
        .await?
    {
        Some(car) => Ok(HttpResponse::Ok().json(car)),
        None => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Car deleted - no owners remaining"
        }))),
    }
}
