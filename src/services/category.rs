//! Category service
//!
//! Administration of categories plus the cached slug lookup used by the
//! category listing.

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use crate::services::check_length;
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

const CACHE_KEY_CATEGORY_BY_SLUG: &str = "category:slug:";

const TITLE_MAX_LEN: usize = 256;
const SLUG_MAX_LEN: usize = 50;

static SLUG_RE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$"));

#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    #[error("Category slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Category not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>, cache: Arc<Cache>, cache_ttl: Duration) -> Self {
        Self {
            repo,
            cache,
            cache_ttl,
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list(false).await.context("Failed to list categories")?)
    }

    pub async fn list_published(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self
            .repo
            .list(true)
            .await
            .context("Failed to list published categories")?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("id {}", id)))
    }

    /// Resolve a slug to a published category.
    ///
    /// Missing and unpublished categories are both `NotFound`. Hits are
    /// cached; a cache failure falls back to the database.
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Category, CategoryServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_CATEGORY_BY_SLUG, slug);

        match self.cache.get::<Category>(&cache_key).await {
            Ok(Some(category)) => {
                tracing::debug!("Category cache hit: {}", slug);
                return Ok(category);
            }
            Ok(None) => tracing::debug!("Category cache miss: {}", slug),
            Err(e) => tracing::warn!("Category cache read failed: {:#}", e),
        }

        let category = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get category by slug")?
            .filter(|c| c.is_published)
            .ok_or_else(|| CategoryServiceError::NotFound(slug.to_string()))?;

        if let Err(e) = self.cache.set(&cache_key, &category, self.cache_ttl).await {
            tracing::warn!("Category cache write failed: {:#}", e);
        }

        Ok(category)
    }

    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, CategoryServiceError> {
        let title = input.title.trim().to_string();
        let slug = input.slug.trim().to_string();
        validate_title(&title)?;
        validate_slug(&slug)?;

        if self
            .repo
            .exists_by_slug(&slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(CategoryServiceError::DuplicateSlug(slug));
        }

        let mut category = Category::new(title, input.description, slug);
        category.is_published = input.is_published;

        let created = self
            .repo
            .create(&category)
            .await
            .context("Failed to create category")?;
        tracing::info!("Created category {} ({})", created.slug, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: UpdateCategoryInput) -> Result<Category, CategoryServiceError> {
        let mut category = self.get_by_id(id).await?;

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            validate_title(&title)?;
            category.title = title;
        }
        if let Some(slug) = input.slug {
            let slug = slug.trim().to_string();
            validate_slug(&slug)?;
            if slug != category.slug
                && self
                    .repo
                    .exists_by_slug(&slug)
                    .await
                    .context("Failed to check slug uniqueness")?
            {
                return Err(CategoryServiceError::DuplicateSlug(slug));
            }
            category.slug = slug;
        }
        if let Some(description) = input.description {
            category.description = description;
        }
        if let Some(is_published) = input.is_published {
            category.is_published = is_published;
        }

        let updated = self
            .repo
            .update(&category)
            .await
            .context("Failed to update category")?;
        self.invalidate_cache().await;
        Ok(updated)
    }

    /// Delete a category. Its posts keep existing with no category.
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let category = self.get_by_id(id).await?;

        self.repo.delete(id).await.context("Failed to delete category")?;
        self.invalidate_cache().await;
        tracing::info!("Deleted category {} ({})", category.slug, id);
        Ok(())
    }

    async fn invalidate_cache(&self) {
        if let Err(e) = self
            .cache
            .delete_pattern(&format!("{}*", CACHE_KEY_CATEGORY_BY_SLUG))
            .await
        {
            tracing::warn!("Failed to invalidate category cache: {:#}", e);
        }
    }
}

fn validate_title(title: &str) -> Result<(), CategoryServiceError> {
    check_length(title, "Title", TITLE_MAX_LEN).map_err(CategoryServiceError::ValidationError)
}

fn validate_slug(slug: &str) -> Result<(), CategoryServiceError> {
    check_length(slug, "Slug", SLUG_MAX_LEN).map_err(CategoryServiceError::ValidationError)?;

    let pattern = SLUG_RE
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Invalid slug pattern: {}", e))?;
    if !pattern.is_match(slug) {
        return Err(CategoryServiceError::ValidationError(
            "Slug may contain only latin letters, digits, hyphens and underscores".to_string(),
        ));
    }
    Ok(())
}
