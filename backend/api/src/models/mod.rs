use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full user row. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub member_no: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub bio: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The public slice of a user embedded in posts, follower lists and cars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub profile_picture: Option<String>,
}

/// A shout as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub is_followers_only: bool,
    pub created_at: DateTime<Utc>,
}

/// A shout joined with its author summary and like set, as served to
/// clients and consumed by the feed engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    pub id: Uuid,
    pub content: String,
    pub is_followers_only: bool,
    pub created_at: DateTime<Utc>,
    pub author: UserSummary,
    /// User ids that liked the post; order carries no meaning.
    pub likes: Vec<Uuid>,
}

/// Row shape for the feed queries; flattened author columns.
#[derive(Debug, Clone, FromRow)]
pub struct FeedPostRow {
    pub id: Uuid,
    pub content: String,
    pub is_followers_only: bool,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_username: String,
    pub author_profile_picture: Option<String>,
    pub likes: Vec<Uuid>,
}

impl From<FeedPostRow> for FeedPost {
    fn from(row: FeedPostRow) -> Self {
        FeedPost {
            id: row.id,
            content: row.content,
            is_followers_only: row.is_followers_only,
            created_at: row.created_at,
            author: UserSummary {
                id: row.author_id,
                name: row.author_name,
                username: row.author_username,
                profile_picture: row.author_profile_picture,
            },
            likes: row.likes,
        }
    }
}

/// One page of the global feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub has_more: bool,
}

/// A catalogued, owned car.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub transmission: String,
    pub fuel_type: String,
    pub drive: String,
    pub cylinders: Option<i32>,
    #[serde(rename = "class")]
    pub body_class: String,
    pub city_mpg: Option<i32>,
    pub highway_mpg: Option<i32>,
    pub combination_mpg: Option<i32>,
    pub image: Option<String>,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Co-owner entry on a car.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CarOwner {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// A car with its creator summary and owner list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarWithOwners {
    #[serde(flatten)]
    pub car: Car,
    pub user: Option<UserSummary>,
    pub owners: Vec<CarOwner>,
}

/// A dream-car entry, stored as free-form JSON on the user row.
///
/// Identity for toggle purposes is the explicit key tuple returned by
/// [`DreamCar::key`], not equality over every field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DreamCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub drive: Option<String>,
    #[serde(default)]
    pub cylinders: Option<i32>,
    #[serde(default, rename = "class")]
    pub body_class: Option<String>,
    #[serde(default)]
    pub city_mpg: Option<i32>,
    #[serde(default)]
    pub highway_mpg: Option<i32>,
    #[serde(default)]
    pub combination_mpg: Option<i32>,
    #[serde(default)]
    pub displacement: Option<f64>,
}

impl DreamCar {
    /// Identity tuple: year, make, model and the trim-level fields.
    pub fn key(&self) -> (i32, &str, &str, Option<&str>, Option<&str>, Option<&str>) {
        (
            self.year,
            self.make.as_str(),
            self.model.as_str(),
            self.transmission.as_deref(),
            self.fuel_type.as_deref(),
            self.drive.as_deref(),
        )
    }

    pub fn same_car(&self, other: &DreamCar) -> bool {
        self.key() == other.key()
    }
}

/// A catalog entry from the external car data API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub drive: Option<String>,
    #[serde(default)]
    pub cylinders: Option<i32>,
    #[serde(default, rename = "class")]
    pub body_class: Option<String>,
    #[serde(default)]
    pub city_mpg: Option<i32>,
    #[serde(default)]
    pub highway_mpg: Option<i32>,
    #[serde(default)]
    pub combination_mpg: Option<i32>,
    /// Engine displacement; the upstream API reports cc, clients expect
    /// liters to one decimal place.
    #[serde(default)]
    pub displacement: Option<f64>,
}

/// A user profile as served to clients: the user row plus social edges
/// and car lists. Counts ride along so clients need not re-derive them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
    pub follower_count: i64,
    pub following_count: i64,
    pub owned_cars: Vec<CarWithOwners>,
    pub dream_cars: Vec<DreamCar>,
}

/// One page of the admin user roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRoster {
    pub users: Vec<AdminRosterEntry>,
    pub total: i64,
    pub has_more: bool,
}

/// Admin roster row with aggregate counts.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminRosterEntry {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub post_count: i64,
    pub follower_count: i64,
    pub following_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dream_car(make: &str, model: &str, year: i32) -> DreamCar {
        DreamCar {
            make: make.to_string(),
            model: model.to_string(),
            year,
            ..DreamCar::default()
        }
    }

    #[test]
    fn dream_car_identity_uses_the_key_tuple() {
        let mut a = dream_car("Mazda", "RX-7", 1994);
        let mut b = dream_car("Mazda", "RX-7", 1994);
        assert!(a.same_car(&b));

        // Non-key fields do not affect identity.
        a.city_mpg = Some(17);
        b.displacement = Some(1.3);
        assert!(a.same_car(&b));

        // Trim-level fields do.
        b.transmission = Some("m".to_string());
        assert!(!a.same_car(&b));
    }

    #[test]
    fn dream_car_identity_distinguishes_years() {
        let a = dream_car("Nissan", "Skyline", 1999);
        let b = dream_car("Nissan", "Skyline", 2002);
        assert!(!a.same_car(&b));
    }
}
