//! Visibility and authorization rules for posts and comments
//!
//! Both rules are plain functions of the resource, the actor and (for
//! visibility) the current time. Nothing here reads ambient request state.
//!
//! A post the actor may not see is reported as missing. A resource the actor
//! may not change sends them back to the post page instead. Callers keep the
//! two outcomes apart.

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

use chrono::{DateTime, Utc};

use crate::models::{CategoryRef, Comment, Post, PostView, User};

/// Who is performing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    User(i64),
}

impl Actor {
    pub fn from_user(user: Option<&User>) -> Self {
        user.map_or(Actor::Anonymous, |u| Actor::User(u.id))
    }

    pub fn user_id(self) -> Option<i64> {
        match self {
            Actor::Anonymous => None,
            Actor::User(id) => Some(id),
        }
    }

    pub fn is_user(self, id: i64) -> bool {
        self.user_id() == Some(id)
    }
}

/// Resources owned by a single author
pub trait Owned {
    fn author_id(&self) -> i64;
}

impl Owned for Post {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl Owned for PostView {
    fn author_id(&self) -> i64 {
        self.post.author_id
    }
}

impl Owned for Comment {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// Whether `actor` may see `post` at `now`.
///
/// Authors always see their own posts. Everyone else needs the post to be
/// published, dated at or before `now`, and filed under a published
/// category. A post without a category is hidden from non-authors.
pub fn can_view(
    post: &Post,
    category: Option<&CategoryRef>,
    actor: Actor,
    now: DateTime<Utc>,
) -> bool {
    if actor.is_user(post.author_id) {
        return true;
    }
    post.is_published && post.pub_date <= now && category.is_some_and(|c| c.is_published)
}

/// [`can_view`] for a joined post view
pub fn can_view_post(view: &PostView, actor: Actor, now: DateTime<Utc>) -> bool {
    can_view(&view.post, view.category.as_ref(), actor, now)
}

/// Whether `actor` may edit or delete `resource`: only its author may.
pub fn can_mutate<R: Owned + ?Sized>(resource: &R, actor: Actor) -> bool {
    actor.is_user(resource.author_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn post(author_id: i64) -> Post {
        Post {
            id: 1,
            title: "Title".to_string(),
            text: "Text".to_string(),
            image: None,
            pub_date: now() - Duration::days(1),
            author_id,
            location_id: None,
            category_id: Some(1),
            is_published: true,
            created_at: now() - Duration::days(2),
        }
    }

    fn category(is_published: bool) -> CategoryRef {
        CategoryRef {
            id: 1,
            title: "News".to_string(),
            slug: "news".to_string(),
            is_published,
        }
    }

    #[test]
    fn test_public_post_visible_to_everyone() {
        let post = post(1);
        let cat = category(true);
        assert!(can_view(&post, Some(&cat), Actor::Anonymous, now()));
        assert!(can_view(&post, Some(&cat), Actor::User(2), now()));
    }

    #[test]
    fn test_future_post_hidden_until_pub_date() {
        let mut post = post(1);
        post.pub_date = now() + Duration::hours(1);
        let cat = category(true);

        assert!(!can_view(&post, Some(&cat), Actor::Anonymous, now()));
        assert!(!can_view(&post, Some(&cat), Actor::User(2), now()));
        assert!(can_view(&post, Some(&cat), Actor::User(1), now()));
        assert!(can_view(&post, Some(&cat), Actor::Anonymous, now() + Duration::hours(1)));
    }

    #[test]
    fn test_unpublished_post_hidden() {
        let mut post = post(1);
        post.is_published = false;
        let cat = category(true);
        assert!(!can_view(&post, Some(&cat), Actor::Anonymous, now()));
        assert!(can_view(&post, Some(&cat), Actor::User(1), now()));
    }

    #[test]
    fn test_unpublished_or_missing_category_hides_post() {
        let post = post(1);
        assert!(!can_view(&post, Some(&category(false)), Actor::User(2), now()));
        assert!(!can_view(&post, None, Actor::User(2), now()));
        assert!(can_view(&post, None, Actor::User(1), now()));
    }

    #[test]
    fn test_can_mutate_only_author() {
        let post = post(1);
        assert!(can_mutate(&post, Actor::User(1)));
        assert!(!can_mutate(&post, Actor::User(2)));
        assert!(!can_mutate(&post, Actor::Anonymous));

        let comment = Comment::new(1, 5, "hi".to_string(), now());
        assert!(can_mutate(&comment, Actor::User(5)));
        assert!(!can_mutate(&comment, Actor::User(1)));
    }

    #[test]
    fn test_actor_from_user() {
        assert_eq!(Actor::from_user(None), Actor::Anonymous);
        let mut user = User::new("u".into(), String::new(), "h".into(), Default::default());
        user.id = 9;
        assert_eq!(Actor::from_user(Some(&user)), Actor::User(9));
        assert_eq!(Actor::User(9).user_id(), Some(9));
        assert_eq!(Actor::Anonymous.user_id(), None);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn arb_post() -> impl Strategy<Value = (Post, Option<CategoryRef>)> {
        (
            1i64..50,
            any::<bool>(),
            -1000i64..1000,
            prop::option::of(any::<bool>()),
        )
            .prop_map(|(author_id, is_published, offset_minutes, category)| {
                let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
                let post = Post {
                    id: 1,
                    title: "t".to_string(),
                    text: "x".to_string(),
                    image: None,
                    pub_date: base + Duration::minutes(offset_minutes),
                    author_id,
                    location_id: None,
                    category_id: category.map(|_| 1),
                    is_published,
                    created_at: base,
                };
                let category = category.map(|is_published| CategoryRef {
                    id: 1,
                    title: "c".to_string(),
                    slug: "c".to_string(),
                    is_published,
                });
                (post, category)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Authors see their own posts whatever their state.
        #[test]
        fn author_always_sees_own_post((post, category) in arb_post()) {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            prop_assert!(can_view(&post, category.as_ref(), Actor::User(post.author_id), now));
        }

        /// Non-authors see exactly the published, past, published-category posts.
        #[test]
        fn others_see_only_public_posts((post, category) in arb_post(), viewer in 50i64..100) {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let expected = post.is_published
                && post.pub_date <= now
                && category.as_ref().is_some_and(|c| c.is_published);
            prop_assert_eq!(can_view(&post, category.as_ref(), Actor::User(viewer), now), expected);
            prop_assert_eq!(can_view(&post, category.as_ref(), Actor::Anonymous, now), expected);
        }

        /// Mutation is granted to the author alone.
        #[test]
        fn mutate_iff_author((post, _) in arb_post(), actor in 0i64..60) {
            prop_assert_eq!(can_mutate(&post, Actor::User(actor)), actor == post.author_id);
            prop_assert!(!can_mutate(&post, Actor::Anonymous));
        }
    }
}
