//! Comment service
//!
//! Comments are addressed through their post: edit and delete look a comment
//! up by both ids, so a comment id under the wrong post is simply not found.

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, CommentView, User};
use crate::policy::{can_mutate, Actor, Clock};
use anyhow::Context;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Denied edits send the caller back to this post
    #[error("Permission denied for a comment on post {post_id}")]
    PermissionDenied { post_id: i64 },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    clock: Arc<dyn Clock>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            comments,
            posts,
            clock,
        }
    }

    /// Comments under a post, oldest first
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, CommentServiceError> {
        Ok(self
            .comments
            .list_by_post(post_id)
            .await
            .context("Failed to list comments")?)
    }

    /// Add a comment to an existing post.
    ///
    /// Only existence is checked; the post's visibility is not.
    pub async fn add(&self, post_id: i64, author: &User, text: &str) -> Result<Comment, CommentServiceError> {
        if self
            .posts
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .is_none()
        {
            return Err(CommentServiceError::NotFound(format!("post {}", post_id)));
        }
        let text = validate_text(text)?;

        let comment = Comment::new(post_id, author.id, text, self.clock.now());
        Ok(self
            .comments
            .create(&comment)
            .await
            .context("Failed to create comment")?)
    }

    pub async fn edit(
        &self,
        post_id: i64,
        comment_id: i64,
        actor: Actor,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        let mut comment = self.find_owned(post_id, comment_id, actor).await?;
        comment.text = validate_text(text)?;

        Ok(self
            .comments
            .update(&comment)
            .await
            .context("Failed to update comment")?)
    }

    pub async fn delete(&self, post_id: i64, comment_id: i64, actor: Actor) -> Result<(), CommentServiceError> {
        self.find_owned(post_id, comment_id, actor).await?;
        self.comments
            .delete(comment_id)
            .await
            .context("Failed to delete comment")?;
        Ok(())
    }

    /// Delete any comment regardless of ownership. Returns the removed comment.
    pub async fn admin_delete(&self, comment_id: i64) -> Result<Comment, CommentServiceError> {
        let comment = self
            .comments
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .ok_or_else(|| CommentServiceError::NotFound(format!("comment {}", comment_id)))?;

        self.comments
            .delete(comment_id)
            .await
            .context("Failed to delete comment")?;
        tracing::info!("Comment {} deleted by an administrator", comment_id);
        Ok(comment)
    }

    async fn find_owned(&self, post_id: i64, comment_id: i64, actor: Actor) -> Result<Comment, CommentServiceError> {
        let comment = self
            .comments
            .get_by_id_and_post(comment_id, post_id)
            .await
            .context("Failed to get comment")?
            .ok_or_else(|| CommentServiceError::NotFound(format!("comment {} on post {}", comment_id, post_id)))?;

        if !can_mutate(&comment, actor) {
            return Err(CommentServiceError::PermissionDenied { post_id });
        }
        Ok(comment)
    }
}

fn validate_text(text: &str) -> Result<String, CommentServiceError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CommentServiceError::ValidationError(
            "Comment text cannot be empty".to_string(),
        ));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::post::tests::{setup, start, Fixture};
    use chrono::Duration;

    fn service(fx: &Fixture) -> CommentService {
        CommentService::new(fx.comments.clone(), fx.posts.clone(), fx.clock.clone())
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let fx = setup().await;
        let comments = service(&fx);
        let author = fx.user("author").await;
        let reader = fx.user("reader").await;
        let post = fx.post_at(&author, "post", start() - Duration::hours(1)).await;

        comments.add(post.post.id, &reader, "  first  ").await.unwrap();
        fx.clock.advance(Duration::minutes(1));
        comments.add(post.post.id, &author, "reply").await.unwrap();

        let listed = comments.list_for_post(post.post.id).await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|c| c.comment.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "reply"]);
        assert_eq!(listed[0].author_username, "reader");
    }

    #[tokio::test]
    async fn test_add_checks_existence_not_visibility() {
        let fx = setup().await;
        let comments = service(&fx);
        let author = fx.user("author").await;
        let reader = fx.user("reader").await;
        let scheduled = fx.post_at(&author, "scheduled", start() + Duration::days(1)).await;

        assert!(comments.add(scheduled.post.id, &reader, "early bird").await.is_ok());
        assert!(matches!(
            comments.add(999, &reader, "hello").await,
            Err(CommentServiceError::NotFound(_))
        ));
        assert!(matches!(
            comments.add(scheduled.post.id, &reader, "   ").await,
            Err(CommentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_someone_elses_comment_is_denied() {
        let fx = setup().await;
        let comments = service(&fx);
        let author = fx.user("author").await;
        let intruder = fx.user("intruder").await;
        let post = fx.post_at(&author, "post", start() - Duration::hours(1)).await;
        let comment = comments.add(post.post.id, &author, "mine").await.unwrap();

        let result = comments
            .edit(post.post.id, comment.id, Actor::User(intruder.id), "defaced")
            .await;
        assert!(matches!(
            result,
            Err(CommentServiceError::PermissionDenied { post_id }) if post_id == post.post.id
        ));

        let stored = fx.comments.get_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(stored.text, "mine");

        let edited = comments
            .edit(post.post.id, comment.id, Actor::User(author.id), "still mine")
            .await
            .unwrap();
        assert_eq!(edited.text, "still mine");
    }

    #[tokio::test]
    async fn test_comment_must_belong_to_post() {
        let fx = setup().await;
        let comments = service(&fx);
        let author = fx.user("author").await;
        let first = fx.post_at(&author, "first", start() - Duration::hours(1)).await;
        let second = fx.post_at(&author, "second", start() - Duration::hours(2)).await;
        let comment = comments.add(first.post.id, &author, "on first").await.unwrap();

        let result = comments
            .edit(second.post.id, comment.id, Actor::User(author.id), "moved")
            .await;
        assert!(matches!(result, Err(CommentServiceError::NotFound(_))));

        let result = comments.delete(second.post.id, comment.id, Actor::User(author.id)).await;
        assert!(matches!(result, Err(CommentServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let fx = setup().await;
        let comments = service(&fx);
        let author = fx.user("author").await;
        let reader = fx.user("reader").await;
        let post = fx.post_at(&author, "post", start() - Duration::hours(1)).await;
        let own = comments.add(post.post.id, &reader, "mine").await.unwrap();
        let other = comments.add(post.post.id, &author, "theirs").await.unwrap();

        assert!(matches!(
            comments.delete(post.post.id, other.id, Actor::User(reader.id)).await,
            Err(CommentServiceError::PermissionDenied { .. })
        ));
        comments.delete(post.post.id, own.id, Actor::User(reader.id)).await.unwrap();

        let removed = comments.admin_delete(other.id).await.unwrap();
        assert_eq!(removed.post_id, post.post.id);
        assert!(comments.list_for_post(post.post.id).await.unwrap().is_empty());
        assert!(matches!(
            comments.admin_delete(other.id).await,
            Err(CommentServiceError::NotFound(_))
        ));
    }
}
