/// Shout lifecycle: creation, deletion, privacy, likes and top-shout
/// ranking.
use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::{admin_repo, post_repo, user_repo, SocialRepository};
use crate::error::{AppError, Result};
use crate::models::{FeedPost, Post};
use crate::services::visibility::{self, Viewer};

/// Result of a like toggle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub likes: i64,
    pub is_liked: bool,
}

/// Pick the top shout from a candidate set: greatest like count wins,
/// most recent `created_at` breaks ties.
pub fn pick_top_shout(candidates: Vec<FeedPost>) -> Option<FeedPost> {
    candidates
        .into_iter()
        .max_by_key(|post| (post.likes.len(), post.created_at))
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a shout.
    pub async fn create_shout(
        &self,
        author_id: Uuid,
        content: &str,
        is_followers_only: bool,
    ) -> Result<Post> {
        if user_repo::find_by_id(&self.pool, author_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let post = post_repo::create_post(&self.pool, author_id, content, is_followers_only).await?;
        info!(post_id = %post.id, author = %author_id, "shout created");
        Ok(post)
    }

    /// Delete a shout. Allowed for the author and for admins.
    pub async fn delete_post(&self, post_id: Uuid, requester_id: Uuid) -> Result<()> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if post.author_id != requester_id && !admin_repo::is_admin(&self.pool, requester_id).await? {
            return Err(AppError::Forbidden(
                "Not authorized to delete this post".to_string(),
            ));
        }

        post_repo::delete_post(&self.pool, post_id).await?;
        info!(%post_id, requester = %requester_id, "shout deleted");
        Ok(())
    }

    /// Flip the followers-only flag.
    pub async fn set_privacy(&self, post_id: Uuid, is_followers_only: bool) -> Result<Post> {
        post_repo::set_privacy(&self.pool, post_id, is_followers_only)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Toggle a like: remove when present, add when absent.
    ///
    /// Two identical calls flip the state twice, returning the like set
    /// to where it started. The membership check and the write are two
    /// statements; rapid repeat toggles from the same user race on that
    /// read-then-write pattern and may lose one flip. Toggles from
    /// different users touch disjoint rows and compose safely.
    pub async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeStatus> {
        if post_repo::find_post_by_id(&self.pool, post_id).await?.is_none() {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let was_liked = post_repo::has_liked(&self.pool, post_id, user_id).await?;
        if was_liked {
            post_repo::remove_like(&self.pool, post_id, user_id).await?;
        } else {
            post_repo::add_like(&self.pool, post_id, user_id).await?;
        }

        let likes = post_repo::like_count(&self.pool, post_id).await?;

        Ok(LikeStatus {
            likes,
            is_liked: !was_liked,
        })
    }

    /// All posts by one user, filtered through the visibility policy for
    /// the given viewer. One follower lookup covers the whole list since
    /// every post shares the author.
    pub async fn user_posts(
        &self,
        profile_user_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> Result<Vec<FeedPost>> {
        if user_repo::find_by_id(&self.pool, profile_user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let posts = post_repo::posts_by_author(&self.pool, profile_user_id).await?;

        let (is_admin, is_follower) = match viewer_id {
            Some(id) => (
                admin_repo::is_admin(&self.pool, id).await?,
                SocialRepository::is_following(&self.pool, id, profile_user_id).await?,
            ),
            None => (false, false),
        };
        let viewer = Viewer::new(viewer_id, is_admin);

        Ok(posts
            .into_iter()
            .filter(|post| visibility::is_visible(post, &viewer, is_follower))
            .collect())
    }

    /// The user's single most recent post. Served unfiltered.
    pub async fn latest_post(&self, author_id: Uuid) -> Result<Option<FeedPost>> {
        Ok(post_repo::latest_by_author(&self.pool, author_id).await?)
    }

    /// Global top shout: the most-liked public post inside the trailing
    /// window.
    pub async fn top_shout_global(&self, window_hours: i64) -> Result<Option<FeedPost>> {
        let window_start = Utc::now() - Duration::hours(window_hours);
        let candidates = post_repo::public_posts_since(&self.pool, window_start).await?;
        Ok(pick_top_shout(candidates))
    }

    /// Per-author top shout: the author's most-liked public post, no
    /// time window.
    pub async fn top_shout_for_user(&self, author_id: Uuid) -> Result<Option<FeedPost>> {
        if user_repo::find_by_id(&self.pool, author_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let candidates = post_repo::public_posts_by_author(&self.pool, author_id).await?;
        Ok(pick_top_shout(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserSummary;

    fn post(likes: usize, age_minutes: i64) -> FeedPost {
        FeedPost {
            id: Uuid::new_v4(),
            content: "shout".to_string(),
            is_followers_only: false,
            created_at: Utc::now() - Duration::minutes(age_minutes),
            author: UserSummary {
                id: Uuid::new_v4(),
                name: "Author".to_string(),
                username: "author".to_string(),
                profile_picture: None,
            },
            likes: (0..likes).map(|_| Uuid::new_v4()).collect(),
        }
    }

    #[test]
    fn top_shout_of_nothing_is_none() {
        assert!(pick_top_shout(vec![]).is_none());
    }

    #[test]
    fn strictly_greatest_like_count_wins() {
        let winner = post(5, 30);
        let winner_id = winner.id;
        let candidates = vec![post(2, 1), winner, post(4, 2)];

        assert_eq!(pick_top_shout(candidates).map(|p| p.id), Some(winner_id));
    }

    #[test]
    fn ties_break_to_the_most_recent_post() {
        let older = post(3, 60);
        let newer = post(3, 5);
        let newer_id = newer.id;

        assert_eq!(
            pick_top_shout(vec![older, newer]).map(|p| p.id),
            Some(newer_id)
        );
    }
}
