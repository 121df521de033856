//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryRef, LocationRef};

/// Sub-directory of the media root holding post images
pub const POST_IMAGES_DIR: &str = "post_images";

/// Whether `path` names a file directly inside [`POST_IMAGES_DIR`].
pub fn is_post_image_path(path: &str) -> bool {
    let Some(name) = path
        .strip_prefix(POST_IMAGES_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return false;
    };
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// A blog post.
///
/// `pub_date` may lie in the future; such posts stay hidden from everyone
/// but their author until that moment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Image path relative to the media root
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub location_id: Option<i64>,
    pub category_id: Option<i64>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author_id: i64, input: PostInput, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            title: input.title,
            text: input.text,
            image: input.image,
            pub_date: input.pub_date.unwrap_or(now),
            author_id,
            location_id: input.location_id,
            category_id: input.category_id,
            is_published: input.is_published,
            created_at: now,
        }
    }

    /// Replace the editable fields with `input`
    pub fn apply(&mut self, input: PostInput) {
        self.title = input.title;
        self.text = input.text;
        self.image = input.image;
        if let Some(pub_date) = input.pub_date {
            self.pub_date = pub_date;
        }
        self.location_id = input.location_id;
        self.category_id = input.category_id;
        self.is_published = input.is_published;
    }
}

/// Author fields joined onto a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorRef {
    pub id: i64,
    pub username: String,
}

/// A post together with its related rows and comment count, as listed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorRef,
    pub category: Option<CategoryRef>,
    pub location: Option<LocationRef>,
    pub comment_count: i64,
}

fn default_true() -> bool {
    true
}

/// Submitted post form, used for both create and edit.
///
/// A missing `pub_date` means "now" on create and "unchanged" on edit.
#[derive(Debug, Clone, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// Filter for post listings, translated into SQL by the repository
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    /// When set, only posts with `is_published` and `pub_date <= visible_at`
    pub visible_at: Option<DateTime<Utc>>,
    /// Only posts whose category is present and published
    pub require_published_category: bool,
}

impl PostFilter {
    /// Public listing filter at `now`
    pub fn public(now: DateTime<Utc>) -> Self {
        Self {
            visible_at: Some(now),
            require_published_category: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn input() -> PostInput {
        serde_json::from_str(r#"{"title":"Hello","text":"World"}"#).unwrap()
    }

    #[test]
    fn test_input_defaults() {
        let input = input();
        assert!(input.is_published);
        assert!(input.pub_date.is_none());
        assert!(input.category_id.is_none());
    }

    #[test]
    fn test_new_uses_now_without_pub_date() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let post = Post::new(7, input(), now);
        assert_eq!(post.pub_date, now);
        assert_eq!(post.author_id, 7);
        assert_eq!(post.created_at, now);
    }

    #[test]
    fn test_apply_keeps_pub_date_when_missing() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut post = Post::new(1, input(), now);

        let mut edit = input();
        edit.title = "Edited".to_string();
        edit.is_published = false;
        post.apply(edit);
        assert_eq!(post.title, "Edited");
        assert!(!post.is_published);
        assert_eq!(post.pub_date, now);

        let mut edit = input();
        edit.pub_date = Some(now + Duration::days(1));
        post.apply(edit);
        assert_eq!(post.pub_date, now + Duration::days(1));
    }

    #[test]
    fn test_post_image_path() {
        assert!(is_post_image_path("post_images/0b5e.png"));
        assert!(is_post_image_path("post_images/photo_1-final.jpeg"));

        assert!(!is_post_image_path("post_images/"));
        assert!(!is_post_image_path("post_images/../config.yml"));
        assert!(!is_post_image_path("post_images/.hidden"));
        assert!(!is_post_image_path("post_images/nested/a.png"));
        assert!(!is_post_image_path("post_imagesx/a.png"));
        assert!(!is_post_image_path("/etc/passwd"));
        assert!(!is_post_image_path("https://example.com/a.png"));
    }

    #[test]
    fn test_public_filter() {
        let now = Utc::now();
        let filter = PostFilter::public(now);
        assert_eq!(filter.visible_at, Some(now));
        assert!(filter.require_published_category);
        assert!(filter.author_id.is_none());
    }
}
