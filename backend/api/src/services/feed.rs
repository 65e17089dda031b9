/// Feed assembly.
///
/// The global feed scans a pre-sorted candidate batch through the
/// visibility policy; the following feed is a plain author-scoped query.
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::db::{admin_repo, post_repo, SocialRepository};
use crate::error::Result;
use crate::models::{FeedPage, FeedPost};
use crate::services::visibility::{self, Access, Viewer};

/// The follower-edge capability the engine consumes.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    async fn is_follower(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool>;
}

/// Follower lookups against the follows table.
pub struct PgSocialGraph {
    pool: PgPool,
}

impl PgSocialGraph {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialGraph for PgSocialGraph {
    async fn is_follower(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
        SocialRepository::is_following(&self.pool, follower_id, author_id).await
    }
}

/// Scan a candidate batch (already sorted `created_at DESC`) and collect
/// the first `page_size` posts visible to the viewer.
///
/// A follower lookup happens only when a post is followers-only and not
/// authored by the viewer. The scan stops as soon as the page is full;
/// when the batch runs out first the page is returned short — the caller
/// does not fetch a second batch.
///
/// `has_more` is a bounded estimate, not an exact count: true when
/// candidates remain unscanned in this batch, or when the batch came
/// back full (storage may hold more). Unscanned candidates may or may
/// not themselves be visible.
pub async fn assemble_feed(
    candidates: Vec<FeedPost>,
    batch_size: usize,
    viewer: &Viewer,
    graph: &dyn SocialGraph,
    page_size: usize,
) -> Result<FeedPage> {
    let batch_len = candidates.len();
    let batch_full = batch_len == batch_size;

    let mut posts = Vec::with_capacity(page_size);
    let mut scanned = 0usize;

    for post in candidates {
        scanned += 1;

        let visible = match (visibility::check(&post, viewer), viewer.id) {
            (Access::Granted, _) => true,
            (Access::Denied, _) => false,
            (Access::NeedsFollowerCheck, Some(viewer_id)) => {
                graph.is_follower(viewer_id, post.author.id).await?
            }
            // check() never asks for the graph without a viewer
            (Access::NeedsFollowerCheck, None) => false,
        };

        if visible {
            posts.push(post);
        }

        if posts.len() >= page_size {
            break;
        }
    }

    let has_more = scanned < batch_len || batch_full;

    Ok(FeedPage { posts, has_more })
}

pub struct FeedService {
    pool: PgPool,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(pool: PgPool, config: FeedConfig) -> Self {
        Self { pool, config }
    }

    /// One page of the global feed, privacy-filtered for the viewer.
    pub async fn global_feed(&self, viewer_id: Option<Uuid>, page: i64) -> Result<FeedPage> {
        let is_admin = match viewer_id {
            Some(id) => admin_repo::is_admin(&self.pool, id).await?,
            None => false,
        };
        let viewer = Viewer::new(viewer_id, is_admin);

        let page_size = self.config.page_size;
        let batch_size = page_size * self.config.batch_multiplier;
        let offset = page * page_size as i64;

        let candidates = post_repo::feed_batch(&self.pool, batch_size as i64, offset).await?;

        debug!(
            page,
            candidates = candidates.len(),
            is_admin,
            "assembling global feed"
        );

        let graph = PgSocialGraph::new(self.pool.clone());
        assemble_feed(candidates, batch_size, &viewer, &graph, page_size).await
    }

    /// The most recent posts from authors the user follows.
    ///
    /// Deliberately performs no visibility filtering: the result is
    /// capped at a handful of posts from explicitly-followed authors,
    /// and followers-only posts from those authors are included as-is.
    /// This is the one place the general policy in
    /// [`crate::services::visibility`] does not apply.
    pub async fn following_feed(&self, user_id: Uuid) -> Result<Vec<FeedPost>> {
        let posts =
            post_repo::posts_by_followed(&self.pool, user_id, self.config.following_limit).await?;

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserSummary;
    use chrono::{Duration, Utc};
    use std::collections::HashSet;

    struct InMemoryGraph {
        edges: HashSet<(Uuid, Uuid)>,
    }

    impl InMemoryGraph {
        fn empty() -> Self {
            Self {
                edges: HashSet::new(),
            }
        }
    }

    #[async_trait]
    impl SocialGraph for InMemoryGraph {
        async fn is_follower(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
            Ok(self.edges.contains(&(follower_id, author_id)))
        }
    }

    fn post(author: Uuid, followers_only: bool, age_minutes: i64) -> FeedPost {
        FeedPost {
            id: Uuid::new_v4(),
            content: format!("shout from {} minutes ago", age_minutes),
            is_followers_only: followers_only,
            created_at: Utc::now() - Duration::minutes(age_minutes),
            author: UserSummary {
                id: author,
                name: "Author".to_string(),
                username: "author".to_string(),
                profile_picture: None,
            },
            likes: vec![],
        }
    }

    #[tokio::test]
    async fn page_is_never_larger_than_page_size() {
        let author = Uuid::new_v4();
        let candidates: Vec<FeedPost> = (0..9).map(|i| post(author, false, i)).collect();

        let page = assemble_feed(candidates, 9, &Viewer::anonymous(), &InMemoryGraph::empty(), 3)
            .await
            .unwrap();

        assert_eq!(page.posts.len(), 3);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn accepted_posts_stay_newest_first() {
        let author = Uuid::new_v4();
        let candidates: Vec<FeedPost> = (0..5).map(|i| post(author, false, i)).collect();

        let page = assemble_feed(candidates, 9, &Viewer::anonymous(), &InMemoryGraph::empty(), 3)
            .await
            .unwrap();

        let times: Vec<_> = page.posts.iter().map(|p| p.created_at).collect();
        let mut sorted = times.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(times, sorted);
    }

    #[tokio::test]
    async fn anonymous_viewer_gets_only_the_public_post() {
        let author = Uuid::new_v4();
        let candidates = vec![post(author, false, 1), post(author, true, 2)];

        let page = assemble_feed(candidates, 9, &Viewer::anonymous(), &InMemoryGraph::empty(), 3)
            .await
            .unwrap();

        assert_eq!(page.posts.len(), 1);
        assert!(!page.posts[0].is_followers_only);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn follower_sees_gated_posts_stranger_does_not() {
        let author = Uuid::new_v4();
        let follower = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let mut graph = InMemoryGraph::empty();
        graph.edges.insert((follower, author));

        let candidates = vec![post(author, true, 1)];

        let follower_page = assemble_feed(
            candidates.clone(),
            9,
            &Viewer::new(Some(follower), false),
            &graph,
            3,
        )
        .await
        .unwrap();
        assert_eq!(follower_page.posts.len(), 1);

        let stranger_page = assemble_feed(
            candidates,
            9,
            &Viewer::new(Some(stranger), false),
            &graph,
            3,
        )
        .await
        .unwrap();
        assert!(stranger_page.posts.is_empty());
    }

    #[tokio::test]
    async fn admin_sees_everything() {
        let candidates = vec![
            post(Uuid::new_v4(), true, 1),
            post(Uuid::new_v4(), true, 2),
            post(Uuid::new_v4(), false, 3),
        ];

        let page = assemble_feed(
            candidates,
            9,
            &Viewer::new(Some(Uuid::new_v4()), true),
            &InMemoryGraph::empty(),
            3,
        )
        .await
        .unwrap();

        assert_eq!(page.posts.len(), 3);
    }

    #[tokio::test]
    async fn full_batch_reports_more_even_when_fully_scanned() {
        let author = Uuid::new_v4();
        // A full batch of gated posts: everything scanned, nothing
        // accepted, but storage may hold more pages.
        let candidates: Vec<FeedPost> = (0..9).map(|i| post(author, true, i)).collect();

        let page = assemble_feed(candidates, 9, &Viewer::anonymous(), &InMemoryGraph::empty(), 3)
            .await
            .unwrap();

        assert!(page.posts.is_empty());
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn short_batch_underfills_without_reporting_more() {
        let author = Uuid::new_v4();
        let candidates = vec![post(author, false, 1), post(author, false, 2)];

        let page = assemble_feed(candidates, 9, &Viewer::anonymous(), &InMemoryGraph::empty(), 3)
            .await
            .unwrap();

        assert_eq!(page.posts.len(), 2);
        assert!(!page.has_more);
    }
}
