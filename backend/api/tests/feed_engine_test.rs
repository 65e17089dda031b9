//! Engine-level tests for feed assembly and the visibility policy,
//! driven by an in-memory social graph.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crunch_api::error::Result;
use crunch_api::models::{FeedPost, UserSummary};
use crunch_api::services::feed::assemble_feed;
use crunch_api::services::visibility::{self, Viewer};
use crunch_api::services::SocialGraph;

struct InMemoryGraph {
    edges: HashSet<(Uuid, Uuid)>,
}

impl InMemoryGraph {
    fn new() -> Self {
        Self {
            edges: HashSet::new(),
        }
    }

    fn follow(&mut self, follower: Uuid, author: Uuid) {
        self.edges.insert((follower, author));
    }
}

#[async_trait]
impl SocialGraph for InMemoryGraph {
    async fn is_follower(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
        Ok(self.edges.contains(&(follower_id, author_id)))
    }
}

fn shout(author: Uuid, followers_only: bool, age_minutes: i64, likes: usize) -> FeedPost {
    FeedPost {
        id: Uuid::new_v4(),
        content: format!("shout at t-{}", age_minutes),
        is_followers_only: followers_only,
        created_at: Utc::now() - Duration::minutes(age_minutes),
        author: UserSummary {
            id: author,
            name: "Author".to_string(),
            username: "author".to_string(),
            profile_picture: None,
        },
        likes: (0..likes).map(|_| Uuid::new_v4()).collect(),
    }
}

#[tokio::test]
async fn anonymous_two_post_scenario() {
    // Viewer is not logged in; one public and one followers-only shout.
    let author = Uuid::new_v4();
    let candidates = vec![shout(author, false, 1, 0), shout(author, true, 2, 0)];

    let page = assemble_feed(candidates, 9, &Viewer::anonymous(), &InMemoryGraph::new(), 3)
        .await
        .unwrap();

    assert_eq!(page.posts.len(), 1);
    assert!(!page.posts[0].is_followers_only);
    assert!(!page.has_more);
}

#[tokio::test]
async fn follower_stranger_and_admin_views_of_a_gated_author() {
    let author = Uuid::new_v4();
    let follower = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let admin = Uuid::new_v4();

    let mut graph = InMemoryGraph::new();
    graph.follow(follower, author);

    let gated = shout(author, true, 5, 2);

    // Through the feed engine.
    for (viewer, expected) in [
        (Viewer::new(Some(follower), false), 1),
        (Viewer::new(Some(stranger), false), 0),
        (Viewer::new(Some(admin), true), 1),
        (Viewer::new(Some(author), false), 1),
    ] {
        let page = assemble_feed(vec![gated.clone()], 9, &viewer, &graph, 3)
            .await
            .unwrap();
        assert_eq!(page.posts.len(), expected, "viewer {:?}", viewer);
    }

    // And through the bare predicate, with the follower fact supplied.
    assert!(visibility::is_visible(
        &gated,
        &Viewer::new(Some(follower), false),
        true
    ));
    assert!(!visibility::is_visible(
        &gated,
        &Viewer::new(Some(stranger), false),
        false
    ));
    assert!(visibility::is_visible(
        &gated,
        &Viewer::new(Some(admin), true),
        false
    ));
}

#[tokio::test]
async fn mixed_batch_pagination_walk() {
    let followed_author = Uuid::new_v4();
    let other_author = Uuid::new_v4();
    let viewer_id = Uuid::new_v4();

    let mut graph = InMemoryGraph::new();
    graph.follow(viewer_id, followed_author);

    // Newest-first candidates alternating privacy and author. The
    // viewer follows only one of the two authors, so gated posts from
    // the other must be skipped while scanning.
    let candidates = vec![
        shout(other_author, true, 1, 0),     // hidden
        shout(followed_author, true, 2, 1),  // visible via follow
        shout(other_author, false, 3, 0),    // public
        shout(other_author, true, 4, 0),     // hidden
        shout(followed_author, false, 5, 3), // public
        shout(other_author, false, 6, 0),    // public, beyond the page
    ];

    let viewer = Viewer::new(Some(viewer_id), false);
    let page = assemble_feed(candidates, 9, &viewer, &graph, 3).await.unwrap();

    assert_eq!(page.posts.len(), 3);
    assert!(page.has_more);

    // Accepted posts keep the newest-first candidate order.
    let times: Vec<_> = page.posts.iter().map(|p| p.created_at).collect();
    let mut sorted = times.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(times, sorted);

    // And none of them are gated posts from the unfollowed author.
    assert!(page
        .posts
        .iter()
        .all(|p| !(p.is_followers_only && p.author.id == other_author)));
}

#[tokio::test]
async fn gated_posts_do_not_leak_into_a_short_page() {
    let author = Uuid::new_v4();
    let viewer = Viewer::new(Some(Uuid::new_v4()), false);

    // Nothing visible at all: the page comes back empty rather than
    // padded, and the exhausted short batch reports no further data.
    let candidates = vec![shout(author, true, 1, 0), shout(author, true, 2, 0)];
    let page = assemble_feed(candidates, 9, &viewer, &InMemoryGraph::new(), 3)
        .await
        .unwrap();

    assert!(page.posts.is_empty());
    assert!(!page.has_more);
}
