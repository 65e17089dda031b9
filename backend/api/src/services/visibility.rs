/// Post visibility policy.
///
/// The one invariant-bearing rule set in the system. Rules apply in
/// order, first match wins:
///
/// 1. admins see everything;
/// 2. public posts are visible to anyone, including anonymous viewers;
/// 3. followers-only posts are hidden from anonymous viewers;
/// 4. authors always see their own posts;
/// 5. followers of the author see followers-only posts;
/// 6. everyone else is denied.
use uuid::Uuid;

use crate::models::FeedPost;

/// The requesting viewer. Admin status is resolved once per request from
/// the admins collection; it is never cached in process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub id: Option<Uuid>,
    pub is_admin: bool,
}

impl Viewer {
    pub fn new(id: Option<Uuid>, is_admin: bool) -> Self {
        Viewer { id, is_admin }
    }

    pub fn anonymous() -> Self {
        Viewer {
            id: None,
            is_admin: false,
        }
    }
}

/// Outcome of the cheap, relationship-free part of the policy.
///
/// `NeedsFollowerCheck` is only ever produced for a followers-only post
/// with a logged-in, non-admin, non-author viewer — the single case
/// where the decision depends on the social graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
    NeedsFollowerCheck,
}

/// Evaluate every rule that does not require a follower lookup.
pub fn check(post: &FeedPost, viewer: &Viewer) -> Access {
    if viewer.is_admin {
        return Access::Granted;
    }

    if !post.is_followers_only {
        return Access::Granted;
    }

    let Some(viewer_id) = viewer.id else {
        return Access::Denied;
    };

    if viewer_id == post.author.id {
        return Access::Granted;
    }

    Access::NeedsFollowerCheck
}

/// The full predicate, with the follower fact supplied by the caller.
pub fn is_visible(post: &FeedPost, viewer: &Viewer, viewer_follows_author: bool) -> bool {
    match check(post, viewer) {
        Access::Granted => true,
        Access::Denied => false,
        Access::NeedsFollowerCheck => viewer_follows_author,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserSummary;
    use chrono::Utc;

    fn post(author: Uuid, followers_only: bool) -> FeedPost {
        FeedPost {
            id: Uuid::new_v4(),
            content: "test shout".to_string(),
            is_followers_only: followers_only,
            created_at: Utc::now(),
            author: UserSummary {
                id: author,
                name: "Author".to_string(),
                username: "author".to_string(),
                profile_picture: None,
            },
            likes: vec![],
        }
    }

    #[test]
    fn public_posts_are_visible_to_everyone() {
        let author = Uuid::new_v4();
        let p = post(author, false);

        assert!(is_visible(&p, &Viewer::anonymous(), false));
        assert!(is_visible(&p, &Viewer::new(Some(Uuid::new_v4()), false), false));
        assert!(is_visible(&p, &Viewer::new(Some(author), false), false));
        assert!(is_visible(&p, &Viewer::new(Some(Uuid::new_v4()), true), false));
    }

    #[test]
    fn followers_only_posts_are_hidden_from_anonymous_viewers() {
        let p = post(Uuid::new_v4(), true);
        assert!(!is_visible(&p, &Viewer::anonymous(), false));
        // The follower fact cannot rescue an anonymous request.
        assert!(!is_visible(&p, &Viewer::anonymous(), true));
    }

    #[test]
    fn authors_see_their_own_followers_only_posts() {
        let author = Uuid::new_v4();
        let p = post(author, true);
        assert!(is_visible(&p, &Viewer::new(Some(author), false), false));
    }

    #[test]
    fn admins_bypass_all_filtering() {
        let p = post(Uuid::new_v4(), true);
        assert!(is_visible(&p, &Viewer::new(Some(Uuid::new_v4()), true), false));
    }

    #[test]
    fn followers_see_followers_only_posts_and_strangers_do_not() {
        let p = post(Uuid::new_v4(), true);
        let viewer = Viewer::new(Some(Uuid::new_v4()), false);

        assert!(is_visible(&p, &viewer, true));
        assert!(!is_visible(&p, &viewer, false));
    }

    #[test]
    fn follower_check_is_only_requested_when_the_graph_matters() {
        let author = Uuid::new_v4();

        assert_eq!(
            check(&post(author, false), &Viewer::anonymous()),
            Access::Granted
        );
        assert_eq!(
            check(&post(author, true), &Viewer::anonymous()),
            Access::Denied
        );
        assert_eq!(
            check(&post(author, true), &Viewer::new(Some(author), false)),
            Access::Granted
        );
        assert_eq!(
            check(&post(author, true), &Viewer::new(Some(Uuid::new_v4()), false)),
            Access::NeedsFollowerCheck
        );
    }
}
