/// User accounts: registration, login, profiles, follows, dream cars and
/// the admin roster.
use rand::Rng;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::{admin_repo, user_repo, SocialRepository};
use crate::error::{AppError, Result};
use crate::models::{AdminRoster, DreamCar, User, UserProfile, UserSummary};
use crate::security::password;
use crate::services::cars::CarService;

const ADMIN_ROSTER_PAGE_SIZE: i64 = 10;

/// Candidate username from a full name: first name plus last initial,
/// lowercased. None when the name has fewer than two parts.
fn name_based_candidate(name: &str) -> Option<String> {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }

    let last_initial = parts.last()?.chars().next()?;
    Some(format!("{}{}", parts[0], last_initial).to_lowercase())
}

/// Fallback candidate from the email address.
fn email_based_candidate(email: &str) -> String {
    email.replacen('@', "_", 1).to_lowercase()
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pick a free username: name-based first, then email-based, then a
    /// random numeric suffix on the email-based candidate.
    async fn generate_username(&self, name: &str, email: &str) -> Result<String> {
        if let Some(candidate) = name_based_candidate(name) {
            if !user_repo::username_exists(&self.pool, &candidate).await? {
                return Ok(candidate);
            }
        }

        let candidate = email_based_candidate(email);
        if !user_repo::username_exists(&self.pool, &candidate).await? {
            return Ok(candidate);
        }

        let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
        Ok(format!("{}_{}", candidate, suffix))
    }

    /// Register a new account with a generated username.
    pub async fn register(&self, email: &str, raw_password: &str, name: &str) -> Result<User> {
        if user_repo::email_exists(&self.pool, email).await? {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let username = self.generate_username(name, email).await?;
        let password_hash = password::hash_password(raw_password)?;

        let user =
            user_repo::create_user(&self.pool, &username, email, &password_hash, name).await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Log a user in by username or email.
    pub async fn login(&self, identifier: &str, raw_password: &str) -> Result<User> {
        let user = user_repo::find_by_identifier(&self.pool, identifier)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        password::verify_password(raw_password, &user.password_hash)?;

        Ok(user)
    }

    /// Full profile: user row, social edges with counts, car lists.
    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let followers = SocialRepository::get_followers(&self.pool, user_id).await?;
        let following = SocialRepository::get_following(&self.pool, user_id).await?;
        let follower_count = followers.len() as i64;
        let following_count = following.len() as i64;

        let owned_cars = CarService::new(self.pool.clone()).owned_cars(user_id).await?;
        let dream_cars = user_repo::dream_cars(&self.pool, user_id)
            .await?
            .unwrap_or_default();

        Ok(UserProfile {
            user,
            followers,
            following,
            follower_count,
            following_count,
            owned_cars,
            dream_cars,
        })
    }

    /// Rename a user; usernames are distinct.
    pub async fn rename(&self, user_id: Uuid, username: &str) -> Result<User> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }

        if user_repo::username_taken_by_other(&self.pool, username, user_id).await? {
            return Err(AppError::BadRequest(
                "Username is already taken".to_string(),
            ));
        }

        user_repo::update_username(&self.pool, user_id, username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Case-insensitive user search, capped at 20 results.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<User>> {
        Ok(user_repo::search(&self.pool, query.unwrap_or(""), 20).await?)
    }

    /// Newest members with a profile picture, for the landing page.
    pub async fn recent_with_photos(&self) -> Result<Vec<UserSummary>> {
        Ok(user_repo::recent_with_photos(&self.pool, 3).await?)
    }

    /// Follower list for an existing user.
    pub async fn followers(&self, user_id: Uuid) -> Result<Vec<UserSummary>> {
        self.ensure_user(user_id).await?;
        SocialRepository::get_followers(&self.pool, user_id).await
    }

    /// Following list for an existing user.
    pub async fn following(&self, user_id: Uuid) -> Result<Vec<UserSummary>> {
        self.ensure_user(user_id).await?;
        SocialRepository::get_following(&self.pool, user_id).await
    }

    /// Dream-car list for an existing user.
    pub async fn dream_cars(&self, user_id: Uuid) -> Result<Vec<DreamCar>> {
        user_repo::dream_cars(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn ensure_user(&self, user_id: Uuid) -> Result<()> {
        if user_repo::find_by_id(&self.pool, user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Follow: rejects duplicate edges, returns the refreshed profile of
    /// the followed user.
    pub async fn follow(&self, target_id: Uuid, follower_id: Uuid) -> Result<UserProfile> {
        let both_exist = user_repo::find_by_id(&self.pool, target_id).await?.is_some()
            && user_repo::find_by_id(&self.pool, follower_id).await?.is_some();
        if !both_exist {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        SocialRepository::follow(&self.pool, follower_id, target_id).await?;
        info!(follower = %follower_id, followed = %target_id, "follow created");

        self.profile(target_id).await
    }

    /// Unfollow; removing an absent edge succeeds quietly.
    pub async fn unfollow(&self, target_id: Uuid, follower_id: Uuid) -> Result<UserProfile> {
        SocialRepository::unfollow(&self.pool, follower_id, target_id).await?;
        info!(follower = %follower_id, followed = %target_id, "follow removed");

        self.profile(target_id).await
    }

    /// Toggle a dream-car entry. Identity is the explicit key tuple on
    /// [`DreamCar`]; a matching entry is removed, otherwise the car is
    /// appended. Returns the new list and whether the car is now saved.
    pub async fn toggle_dream_car(
        &self,
        user_id: Uuid,
        car: DreamCar,
    ) -> Result<(Vec<DreamCar>, bool)> {
        let mut cars = user_repo::dream_cars(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let already_saved = cars.iter().any(|saved| saved.same_car(&car));
        if already_saved {
            cars.retain(|saved| !saved.same_car(&car));
        } else {
            cars.push(car);
        }

        user_repo::set_dream_cars(&self.pool, user_id, &cars).await?;

        Ok((cars, !already_saved))
    }

    /// Per-request admin capability check.
    pub async fn is_admin(&self, user_id: Uuid) -> Result<bool> {
        admin_repo::is_admin(&self.pool, user_id).await
    }

    /// Admin-only paginated roster with aggregate counts.
    pub async fn admin_roster(&self, requester_id: Uuid, page: i64) -> Result<AdminRoster> {
        if !admin_repo::is_admin(&self.pool, requester_id).await? {
            return Err(AppError::Forbidden("Admin privileges required".to_string()));
        }

        let offset = page * ADMIN_ROSTER_PAGE_SIZE;
        let users = user_repo::admin_roster(&self.pool, ADMIN_ROSTER_PAGE_SIZE, offset).await?;
        let total = user_repo::count_users(&self.pool).await?;
        let has_more = (page + 1) * ADMIN_ROSTER_PAGE_SIZE < total;

        Ok(AdminRoster {
            users,
            total,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_candidate_is_first_name_plus_last_initial() {
        assert_eq!(
            name_based_candidate("Ben Wakefield"),
            Some("benw".to_string())
        );
        assert_eq!(
            name_based_candidate("Mary Jane Watson"),
            Some("maryw".to_string())
        );
    }

    #[test]
    fn single_part_names_have_no_candidate() {
        assert_eq!(name_based_candidate("Prince"), None);
        assert_eq!(name_based_candidate("   "), None);
    }

    #[test]
    fn email_candidate_swaps_the_at_sign() {
        assert_eq!(
            email_based_candidate("Ben@example.com"),
            "ben_example.com".to_string()
        );
    }
}
