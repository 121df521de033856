//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category that groups posts.
///
/// Posts in an unpublished category disappear from the public listings and
/// from non-author detail views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// URL-friendly identifier, unique
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new published Category. The ID is assigned by the database.
    pub fn new(title: String, description: String, slug: String) -> Self {
        Self {
            id: 0,
            title,
            description,
            slug,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    /// The subset of fields embedded in post views
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            is_published: self.is_published,
        }
    }
}

/// Category fields joined onto a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

fn default_true() -> bool {
    true
}

/// Input for creating a category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// Input for updating a category. Missing fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_published: Option<bool>,
}
