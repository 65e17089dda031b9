/// Owned-car catalog: creation, co-ownership transfer and lookups.
use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::car_repo::{self, NewCar};
use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::models::{Car, CarWithOwners, CatalogCar};

/// Placeholder shown when a car is catalogued without a description.
pub const DEFAULT_CAR_DESCRIPTION: &str = "no description provided";

/// Build an insertable car from a catalog entry plus a description.
pub fn new_car_from_catalog(car: CatalogCar, description: Option<String>) -> NewCar {
    NewCar {
        make: car.make,
        model: car.model,
        year: car.year,
        transmission: car.transmission.unwrap_or_default(),
        fuel_type: car.fuel_type.unwrap_or_default(),
        drive: car.drive.unwrap_or_default(),
        cylinders: car.cylinders,
        body_class: car.body_class.unwrap_or_default(),
        city_mpg: car.city_mpg,
        highway_mpg: car.highway_mpg,
        combination_mpg: car.combination_mpg,
        image: None,
        description: description.unwrap_or_else(|| DEFAULT_CAR_DESCRIPTION.to_string()),
    }
}

pub struct CarService {
    pool: PgPool,
}

impl CarService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_user(&self, user_id: Uuid) -> Result<()> {
        if user_repo::find_by_id(&self.pool, user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Attach creator summaries and owner lists to a set of cars.
    async fn hydrate(&self, cars: Vec<Car>) -> Result<Vec<CarWithOwners>> {
        let car_ids: Vec<Uuid> = cars.iter().map(|c| c.id).collect();
        let creator_ids: Vec<Uuid> = cars.iter().map(|c| c.created_by).collect();

        let mut owners_by_car: HashMap<Uuid, Vec<_>> = HashMap::new();
        for (car_id, owner) in car_repo::owners_for_cars(&self.pool, &car_ids).await? {
            owners_by_car.entry(car_id).or_default().push(owner);
        }

        let creators: HashMap<Uuid, _> = user_repo::summaries_by_ids(&self.pool, &creator_ids)
            .await?
            .into_iter()
            .map(|summary| (summary.id, summary))
            .collect();

        Ok(cars
            .into_iter()
            .map(|car| CarWithOwners {
                user: creators.get(&car.created_by).cloned(),
                owners: owners_by_car.remove(&car.id).unwrap_or_default(),
                car,
            })
            .collect())
    }

    /// Cars owned by a user, with creator and owner details.
    pub async fn owned_cars(&self, user_id: Uuid) -> Result<Vec<CarWithOwners>> {
        let cars = car_repo::cars_owned_by(&self.pool, user_id).await?;
        self.hydrate(cars).await
    }

    /// Owned-car list for an existing user; 404 for unknown users.
    pub async fn owned_cars_checked(&self, user_id: Uuid) -> Result<Vec<CarWithOwners>> {
        self.ensure_user(user_id).await?;
        self.owned_cars(user_id).await
    }

    /// Catalog a car with the caller as its first owner; returns the
    /// refreshed owned-car list.
    pub async fn add_owned_car(&self, user_id: Uuid, car: NewCar) -> Result<Vec<CarWithOwners>> {
        self.ensure_user(user_id).await?;

        let created = car_repo::create_car(&self.pool, user_id, &car).await?;
        info!(car_id = %created.id, owner = %user_id, "car catalogued");

        self.owned_cars(user_id).await
    }

    /// Drop the user's ownership of a car; the last owner's departure
    /// deletes the car itself. Returns the refreshed owned-car list.
    pub async fn remove_owned_car(&self, user_id: Uuid, car_id: Uuid) -> Result<Vec<CarWithOwners>> {
        self.ensure_user(user_id).await?;
        if car_repo::find_by_id(&self.pool, car_id).await?.is_none() {
            return Err(AppError::NotFound("User or car not found".to_string()));
        }

        let car_deleted = car_repo::remove_owner(&self.pool, car_id, user_id).await?;
        if car_deleted {
            info!(%car_id, "car deleted - no owners remaining");
        }

        self.owned_cars(user_id).await
    }

    /// A single car with owners, plus whether the viewer owns it.
    pub async fn car_details(
        &self,
        car_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> Result<(CarWithOwners, bool)> {
        let car = car_repo::find_with_owners(&self.pool, car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        let is_owner = match viewer_id {
            Some(id) => car.owners.iter().any(|owner| owner.id == id),
            None => false,
        };

        Ok((car, is_owner))
    }

    /// Add a co-owner to a car.
    pub async fn add_co_owner(&self, car_id: Uuid, new_owner_id: Uuid) -> Result<CarWithOwners> {
        let car = car_repo::find_with_owners(&self.pool, car_id).await?;
        let new_owner = user_repo::find_by_id(&self.pool, new_owner_id).await?;

        let (Some(car), Some(_)) = (car, new_owner) else {
            return Err(AppError::NotFound("Car or user not found".to_string()));
        };

        if car.owners.iter().any(|owner| owner.id == new_owner_id) {
            return Err(AppError::BadRequest(
                "User is already an owner of this car".to_string(),
            ));
        }

        car_repo::add_owner(&self.pool, car_id, new_owner_id).await?;
        info!(%car_id, new_owner = %new_owner_id, "co-owner added");

        car_repo::find_with_owners(&self.pool, car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))
    }

    /// Remove a co-owner. Returns None when the removal deleted the car.
    pub async fn remove_co_owner(
        &self,
        car_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<CarWithOwners>> {
        let car = car_repo::find_by_id(&self.pool, car_id).await?;
        let owner = user_repo::find_by_id(&self.pool, owner_id).await?;
        if car.is_none() || owner.is_none() {
            return Err(AppError::NotFound("Car or user not found".to_string()));
        }

        let car_deleted = car_repo::remove_owner(&self.pool, car_id, owner_id).await?;
        if car_deleted {
            info!(%car_id, "car deleted - no owners remaining");
            return Ok(None);
        }

        Ok(car_repo::find_with_owners(&self.pool, car_id).await?)
    }

    /// Update a car's description.
    pub async fn update_description(
        &self,
        car_id: Uuid,
        description: &str,
    ) -> Result<CarWithOwners> {
        car_repo::update_description(&self.pool, car_id, description)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        car_repo::find_with_owners(&self.pool, car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))
    }

    /// Search the saved-car catalog.
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<CarWithOwners>> {
        let cars = car_repo::search_cars(&self.pool, query, limit).await?;
        self.hydrate(cars).await
    }
}
