//! Location model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A place a post can be attached to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(name: String) -> Self {
        Self {
            id: 0,
            name,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

/// Location fields joined onto a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRef {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocationInput {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLocationInput {
    pub name: Option<String>,
    pub is_published: Option<bool>,
}
