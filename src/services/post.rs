//! Post service
//!
//! The three paged listings (index, category, profile), the detail view and
//! post mutations. Visibility and ownership decisions are delegated to
//! [`crate::policy`].

use crate::db::repositories::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use crate::models::{
    is_post_image_path, Category, CommentView, Page, PageRequest, Paginator, Post, PostFilter, PostInput, PostView,
    User, POSTS_PER_PAGE, POST_IMAGES_DIR,
};
use crate::policy::{can_mutate, can_view_post, Actor, Clock};
use crate::services::category::{CategoryService, CategoryServiceError};
use crate::services::check_length;
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;

const TITLE_MAX_LEN: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Missing, or hidden from the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller may not change this post (or a comment under it)
    #[error("Permission denied for post {post_id}")]
    PermissionDenied { post_id: i64 },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<CategoryServiceError> for PostServiceError {
    fn from(e: CategoryServiceError) -> Self {
        match e {
            CategoryServiceError::NotFound(slug) => PostServiceError::NotFound(format!("category {}", slug)),
            CategoryServiceError::ValidationError(msg) => PostServiceError::ValidationError(msg),
            CategoryServiceError::DuplicateSlug(slug) => {
                PostServiceError::InternalError(anyhow::anyhow!("unexpected duplicate slug {}", slug))
            }
            CategoryServiceError::InternalError(e) => PostServiceError::InternalError(e),
        }
    }
}

/// A post page: the post, its comments (oldest first) and their count
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub comment_count: i64,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    locations: Arc<dyn LocationRepository>,
    categories: Arc<CategoryService>,
    clock: Arc<dyn Clock>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        locations: Arc<dyn LocationRepository>,
        categories: Arc<CategoryService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            comments,
            users,
            category_repo,
            locations,
            categories,
            clock,
        }
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Home page: every publicly visible post. The actor does not matter.
    pub async fn list_index(&self, _actor: Actor, page: PageRequest) -> Result<Page<PostView>, PostServiceError> {
        let filter = PostFilter::public(self.clock.now());
        self.paginate(&filter, page).await
    }

    /// Publicly visible posts of one published category.
    ///
    /// Returns the category with the page. An unknown or unpublished slug
    /// is `NotFound`.
    pub async fn list_by_category(
        &self,
        slug: &str,
        _actor: Actor,
        page: PageRequest,
    ) -> Result<(Category, Page<PostView>), PostServiceError> {
        let category = self.categories.get_published_by_slug(slug).await?;

        let filter = PostFilter {
            category_id: Some(category.id),
            ..PostFilter::public(self.clock.now())
        };
        let posts = self.paginate(&filter, page).await?;
        Ok((category, posts))
    }

    /// All posts of one user. The owner sees drafts and scheduled posts;
    /// other viewers only see published posts dated in the past. Category
    /// state is not considered.
    pub async fn list_by_profile(
        &self,
        username: &str,
        viewer: Actor,
        page: PageRequest,
    ) -> Result<(User, Page<PostView>), PostServiceError> {
        let profile = self
            .users
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?
            .ok_or_else(|| PostServiceError::NotFound(format!("user {}", username)))?;

        let filter = PostFilter {
            author_id: Some(profile.id),
            visible_at: (!viewer.is_user(profile.id)).then(|| self.clock.now()),
            ..PostFilter::default()
        };
        let posts = self.paginate(&filter, page).await?;
        Ok((profile, posts))
    }

    async fn paginate(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<PostView>, PostServiceError> {
        let total = self.posts.count(filter).await.context("Failed to count posts")?;
        let paginator = Paginator::new(total, POSTS_PER_PAGE);
        let page_number = paginator.resolve(page);

        let items = self
            .posts
            .query(filter, paginator.window(page_number))
            .await
            .context("Failed to query posts")?;

        Ok(Page::new(items, page_number, &paginator))
    }

    // ========================================================================
    // Single post
    // ========================================================================

    /// Load a post with its comments, or `NotFound` if `actor` may not see it.
    pub async fn get_detail(&self, post_id: i64, actor: Actor) -> Result<PostDetail, PostServiceError> {
        let post = self
            .posts
            .get_view(post_id)
            .await
            .context("Failed to get post")?
            .filter(|view| can_view_post(view, actor, self.clock.now()))
            .ok_or_else(|| PostServiceError::NotFound(format!("post {}", post_id)))?;

        let (comments, comment_count) = futures::try_join!(
            self.comments.list_by_post(post_id),
            self.comments.count_by_post(post_id)
        )
        .context("Failed to load comments")?;

        Ok(PostDetail {
            post,
            comments,
            comment_count,
        })
    }

    pub async fn create(&self, author: &User, input: PostInput) -> Result<PostView, PostServiceError> {
        let input = self.validate(input).await?;
        let post = Post::new(author.id, input, self.clock.now());

        let created = self.posts.create(&post).await.context("Failed to create post")?;
        tracing::info!("User {} created post {}", author.username, created.id);
        self.load_view(created.id).await
    }

    /// Replace the editable fields of a post owned by `actor`.
    pub async fn update(&self, post_id: i64, actor: Actor, input: PostInput) -> Result<PostView, PostServiceError> {
        let mut post = self.find_owned(post_id, actor).await?;
        let input = self.validate(input).await?;

        post.apply(input);
        self.posts.update(&post).await.context("Failed to update post")?;
        self.load_view(post_id).await
    }

    /// Delete a post owned by `actor`. Its comments go with it.
    pub async fn delete(&self, post_id: i64, actor: Actor) -> Result<Post, PostServiceError> {
        let post = self.find_owned(post_id, actor).await?;
        self.posts.delete(post_id).await.context("Failed to delete post")?;
        Ok(post)
    }

    /// Delete any post regardless of ownership.
    pub async fn admin_delete(&self, post_id: i64) -> Result<Post, PostServiceError> {
        let post = self.find(post_id).await?;
        self.posts.delete(post_id).await.context("Failed to delete post")?;
        tracing::info!("Post {} deleted by an administrator", post_id);
        Ok(post)
    }

    async fn find(&self, post_id: i64) -> Result<Post, PostServiceError> {
        self.posts
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("post {}", post_id)))
    }

    async fn find_owned(&self, post_id: i64, actor: Actor) -> Result<Post, PostServiceError> {
        let post = self.find(post_id).await?;
        if !can_mutate(&post, actor) {
            return Err(PostServiceError::PermissionDenied { post_id });
        }
        Ok(post)
    }

    async fn load_view(&self, post_id: i64) -> Result<PostView, PostServiceError> {
        self.posts
            .get_view(post_id)
            .await
            .context("Failed to load post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("post {}", post_id)))
    }

    /// Trim and check the form, including that referenced rows exist.
    async fn validate(&self, mut input: PostInput) -> Result<PostInput, PostServiceError> {
        input.title = input.title.trim().to_string();
        check_length(&input.title, "Title", TITLE_MAX_LEN).map_err(PostServiceError::ValidationError)?;
        if input.text.trim().is_empty() {
            return Err(PostServiceError::ValidationError("Text cannot be empty".to_string()));
        }
        input.image = input
            .image
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty());
        if let Some(image) = &input.image {
            if !is_post_image_path(image) {
                return Err(PostServiceError::ValidationError(format!(
                    "Image must be an uploaded file under '{}/'",
                    POST_IMAGES_DIR
                )));
            }
        }

        if let Some(category_id) = input.category_id {
            if self
                .category_repo
                .get_by_id(category_id)
                .await
                .context("Failed to check category")?
                .is_none()
            {
                return Err(PostServiceError::ValidationError(format!(
                    "Category {} does not exist",
                    category_id
                )));
            }
        }
        if let Some(location_id) = input.location_id {
            if self
                .locations
                .get_by_id(location_id)
                .await
                .context("Failed to check location")?
                .is_none()
            {
                return Err(PostServiceError::ValidationError(format!(
                    "Location {} does not exist",
                    location_id
                )));
            }
        }

        Ok(input)
    }
}
