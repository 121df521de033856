//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: i64, author_id: i64, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            post_id,
            author_id,
            text,
            created_at: now,
        }
    }
}

/// Comment with the author's username, as displayed under a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_username: String,
}

/// Submitted comment form
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub text: String,
}
