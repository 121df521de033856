//! Location service

use crate::db::repositories::LocationRepository;
use crate::models::{CreateLocationInput, Location, UpdateLocationInput};
use crate::services::check_length;
use anyhow::Context;
use std::sync::Arc;

const NAME_MAX_LEN: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum LocationServiceError {
    #[error("Location not found: {0}")]
    NotFound(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct LocationService {
    repo: Arc<dyn LocationRepository>,
}

impl LocationService {
    pub fn new(repo: Arc<dyn LocationRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_all(&self) -> Result<Vec<Location>, LocationServiceError> {
        Ok(self.repo.list(false).await.context("Failed to list locations")?)
    }

    pub async fn list_published(&self) -> Result<Vec<Location>, LocationServiceError> {
        Ok(self
            .repo
            .list(true)
            .await
            .context("Failed to list published locations")?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Location, LocationServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get location")?
            .ok_or(LocationServiceError::NotFound(id))
    }

    pub async fn create(&self, input: CreateLocationInput) -> Result<Location, LocationServiceError> {
        let name = input.name.trim().to_string();
        validate_name(&name)?;

        let mut location = Location::new(name);
        location.is_published = input.is_published;

        Ok(self
            .repo
            .create(&location)
            .await
            .context("Failed to create location")?)
    }

    pub async fn update(&self, id: i64, input: UpdateLocationInput) -> Result<Location, LocationServiceError> {
        let mut location = self.get_by_id(id).await?;

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            validate_name(&name)?;
            location.name = name;
        }
        if let Some(is_published) = input.is_published {
            location.is_published = is_published;
        }

        Ok(self
            .repo
            .update(&location)
            .await
            .context("Failed to update location")?)
    }

    /// Delete a location. Posts pointing at it lose their location.
    pub async fn delete(&self, id: i64) -> Result<(), LocationServiceError> {
        self.get_by_id(id).await?;
        self.repo.delete(id).await.context("Failed to delete location")?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), LocationServiceError> {
    check_length(name, "Name", NAME_MAX_LEN).map_err(LocationServiceError::ValidationError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxLocationRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> LocationService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        LocationService::new(SqlxLocationRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_crud() {
        let service = setup().await;

        let created = service
            .create(CreateLocationInput {
                name: "  Moscow ".to_string(),
                is_published: true,
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Moscow");

        let updated = service
            .update(
                created.id,
                UpdateLocationInput {
                    is_published: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_published);
        assert_eq!(updated.name, "Moscow");

        assert_eq!(service.list_all().await.unwrap().len(), 1);
        assert!(service.list_published().await.unwrap().is_empty());

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.get_by_id(created.id).await,
            Err(LocationServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_validation() {
        let service = setup().await;

        for name in ["", "   ", &"x".repeat(NAME_MAX_LEN + 1)] {
            let result = service
                .create(CreateLocationInput {
                    name: name.to_string(),
                    is_published: true,
                })
                .await;
            assert!(matches!(result, Err(LocationServiceError::ValidationError(_))));
        }
    }

    #[tokio::test]
    async fn test_update_missing() {
        let service = setup().await;
        let result = service.update(42, UpdateLocationInput::default()).await;
        assert!(matches!(result, Err(LocationServiceError::NotFound(42))));
    }
}
