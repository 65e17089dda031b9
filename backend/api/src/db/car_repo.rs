/// Car repository: the owned-car catalog and its co-ownership edges.
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use crate::models::{Car, CarOwner, CarWithOwners, UserSummary};

const CAR_COLUMNS: &str = "id, make, model, year, transmission, fuel_type, drive, cylinders, \
                           body_class, city_mpg, highway_mpg, combination_mpg, image, \
                           description, created_by, created_at, updated_at";

/// Parameters for inserting a new car.
#[derive(Debug, Clone)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub transmission: String,
    pub fuel_type: String,
    pub drive: String,
    pub cylinders: Option<i32>,
    pub body_class: String,
    pub city_mpg: Option<i32>,
    pub highway_mpg: Option<i32>,
    pub combination_mpg: Option<i32>,
    pub image: Option<String>,
    pub description: String,
}

/// Create a car and record the creator as its first owner, atomically.
pub async fn create_car(
    pool: &PgPool,
    creator_id: Uuid,
    car: &NewCar,
) -> Result<Car, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let created = sqlx::query_as::<_, Car>(&format!(
        r#"
        INSERT INTO cars (make, model, year, transmission, fuel_type, drive, cylinders,
                          body_class, city_mpg, highway_mpg, combination_mpg, image,
                          description, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {CAR_COLUMNS}
        "#
    ))
    .bind(&car.make)
    .bind(&car.model)
    .bind(car.year)
    .bind(&car.transmission)
    .bind(&car.fuel_type)
    .bind(&car.drive)
    .bind(car.cylinders)
    .bind(&car.body_class)
    .bind(car.city_mpg)
    .bind(car.highway_mpg)
    .bind(car.combination_mpg)
    .bind(&car.image)
    .bind(&car.description)
    .bind(creator_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO car_owners (car_id, user_id) VALUES ($1, $2)")
        .bind(created.id)
        .bind(creator_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(created)
}

pub async fn find_by_id(pool: &PgPool, car_id: Uuid) -> Result<Option<Car>, sqlx::Error> {
    let car = sqlx::query_as::<_, Car>(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = $1"))
        .bind(car_id)
        .fetch_optional(pool)
        .await?;

    Ok(car)
}

/// Car with creator summary and owner list.
pub async fn find_with_owners(
    pool: &PgPool,
    car_id: Uuid,
) -> Result<Option<CarWithOwners>, sqlx::Error> {
    let Some(car) = find_by_id(pool, car_id).await? else {
        return Ok(None);
    };

    let creator = sqlx::query_as::<_, UserSummary>(
        "SELECT id, name, username, profile_picture FROM users WHERE id = $1",
    )
    .bind(car.created_by)
    .fetch_optional(pool)
    .await?;

    let owners = owners(pool, car_id).await?;

    Ok(Some(CarWithOwners {
        car,
        user: creator,
        owners,
    }))
}

/// Owner list for a car, in joining order.
pub async fn owners(pool: &PgPool, car_id: Uuid) -> Result<Vec<CarOwner>, sqlx::Error> {
    let owners = sqlx::query_as::<_, CarOwner>(
        r#"
        SELECT u.id, u.name, u.username, u.profile_picture, o.joined_at
        FROM car_owners o
        JOIN users u ON u.id = o.user_id
        WHERE o.car_id = $1
        ORDER BY o.joined_at ASC
        "#,
    )
    .bind(car_id)
    .fetch_all(pool)
    .await?;

    Ok(owners)
}

#[derive(Debug, FromRow)]
struct CarOwnerRow {
    car_id: Uuid,
    id: Uuid,
    name: String,
    username: String,
    profile_picture: Option<String>,
    joined_at: DateTime<Utc>,
}

/// Owner lists for a set of cars in one round trip.
pub async fn owners_for_cars(
    pool: &PgPool,
    car_ids: &[Uuid],
) -> Result<Vec<(Uuid, CarOwner)>, sqlx::Error> {
    if car_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, CarOwnerRow>(
        r#"
        SELECT o.car_id, u.id, u.name, u.username, u.profile_picture, o.joined_at
        FROM car_owners o
        JOIN users u ON u.id = o.user_id
        WHERE o.car_id = ANY($1)
        ORDER BY o.joined_at ASC
        "#,
    )
    .bind(car_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.car_id,
                CarOwner {
                    id: row.id,
                    name: row.name,
                    username: row.username,
                    profile_picture: row.profile_picture,
                    joined_at: row.joined_at,
                },
            )
        })
        .collect())
}

pub async fn add_owner(pool: &PgPool, car_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO car_owners (car_id, user_id) VALUES ($1, $2)")
        .bind(car_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove an owner. When the last owner leaves, the car itself is
/// deleted. Returns true when the car was deleted.
pub async fn remove_owner(pool: &PgPool, car_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM car_owners WHERE car_id = $1 AND user_id = $2")
        .bind(car_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let remaining: i64 = sqlx::query("SELECT COUNT(*) FROM car_owners WHERE car_id = $1")
        .bind(car_id)
        .fetch_one(&mut *tx)
        .await?
        .get(0);

    let car_deleted = remaining == 0;
    if car_deleted {
        sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(car_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(car_deleted)
}

pub async fn update_description(
    pool: &PgPool,
    car_id: Uuid,
    description: &str,
) -> Result<Option<Car>, sqlx::Error> {
    let car = sqlx::query_as::<_, Car>(&format!(
        r#"
        UPDATE cars
        SET description = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {CAR_COLUMNS}
        "#
    ))
    .bind(car_id)
    .bind(description)
    .fetch_optional(pool)
    .await?;

    Ok(car)
}

/// Cars a user owns, newest first.
pub async fn cars_owned_by(pool: &PgPool, user_id: Uuid) -> Result<Vec<Car>, sqlx::Error> {
    let cars = sqlx::query_as::<_, Car>(&format!(
        r#"
        SELECT {CAR_COLUMNS}
        FROM cars
        WHERE id IN (SELECT car_id FROM car_owners WHERE user_id = $1)
        ORDER BY created_at DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(cars)
}

/// Search the saved-car catalog by make/model, optionally matching a
/// year when the query parses as one.
pub async fn search_cars(
    pool: &PgPool,
    query: &str,
    limit: i64,
) -> Result<Vec<Car>, sqlx::Error> {
    let pattern = format!("%{}%", query);
    let year: Option<i32> = query.trim().parse().ok();

    let cars = sqlx::query_as::<_, Car>(&format!(
        r#"
        SELECT {CAR_COLUMNS}
        FROM cars
        WHERE make ILIKE $1 OR model ILIKE $1 OR year = $2
        ORDER BY created_at DESC
        LIMIT $3
        "#
    ))
    .bind(pattern)
    .bind(year)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(cars)
}
