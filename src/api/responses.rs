//! Shared API response types
//!
//! Response shapes used by several endpoints, and the mapping from service
//! errors to `ApiError`.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Serialize;
use std::convert::Infallible;

use crate::api::middleware::ApiError;
use crate::models::{PageRequest, User};
use crate::services::{
    CategoryServiceError, CommentServiceError, LocationServiceError, PostServiceError, UserServiceError,
};

/// `?page=` as sent by the client. Anything that is not an integer means page 1.
///
/// Extraction never fails: when the key repeats, the last value wins.
#[derive(Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let page = pairs.into_iter().rev().find(|(key, _)| key == "page").map(|(_, value)| value);
        Self { page }
    }
}

impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(pairs)) => Ok(Self::from_pairs(pairs)),
            Err(e) => {
                tracing::debug!("Ignoring unreadable query string: {}", e);
                Ok(Self::default())
            }
        }
    }
}

/// Public user fields
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// A user's profile as seen by others: no email
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

impl From<PostServiceError> for ApiError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::NotFound(msg) => ApiError::not_found(format!("Not found: {}", msg)),
            PostServiceError::PermissionDenied { post_id } => ApiError::redirect_to_post(post_id),
            PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            PostServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(e: CommentServiceError) -> Self {
        match e {
            CommentServiceError::NotFound(msg) => ApiError::not_found(format!("Not found: {}", msg)),
            CommentServiceError::PermissionDenied { post_id } => ApiError::redirect_to_post(post_id),
            CommentServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CommentServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<CategoryServiceError> for ApiError {
    fn from(e: CategoryServiceError) -> Self {
        match e {
            CategoryServiceError::NotFound(what) => ApiError::not_found(format!("Category not found: {}", what)),
            CategoryServiceError::DuplicateSlug(slug) => {
                ApiError::with_details("CONFLICT", "Category slug already exists", serde_json::json!({ "slug": slug }))
            }
            CategoryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CategoryServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<LocationServiceError> for ApiError {
    fn from(e: LocationServiceError) -> Self {
        match e {
            LocationServiceError::NotFound(id) => ApiError::not_found(format!("Location not found: {}", id)),
            LocationServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            LocationServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::AuthenticationError(_) => ApiError::unauthorized("Invalid username or password"),
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::UserExists(msg) => ApiError::conflict(msg),
            UserServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_page_query() {
        assert_eq!(PageQuery::default().request().number(), 1);
        let query = PageQuery { page: Some("abc".into()) };
        assert_eq!(query.request().number(), 1);
        let query = PageQuery { page: Some("3".into()) };
        assert_eq!(query.request().number(), 3);
    }

    #[test]
    fn test_page_query_last_value_wins() {
        let pairs = vec![
            ("page".to_string(), "1".to_string()),
            ("sort".to_string(), "new".to_string()),
            ("page".to_string(), "2".to_string()),
        ];
        assert_eq!(PageQuery::from_pairs(pairs).page.as_deref(), Some("2"));
        assert!(PageQuery::from_pairs(Vec::new()).page.is_none());
    }

    #[tokio::test]
    async fn test_page_query_extraction_never_rejects() {
        let request = axum::http::Request::builder()
            .uri("/posts?page=x&page=4&page")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let query = PageQuery::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(query.page.as_deref(), Some(""));
        assert_eq!(query.request().number(), 1);
    }

    #[test]
    fn test_post_errors() {
        let error: ApiError = PostServiceError::NotFound("post 1".into()).into();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);

        let error: ApiError = PostServiceError::PermissionDenied { post_id: 9 }.into();
        assert_eq!(error.status(), StatusCode::SEE_OTHER);
        assert_eq!(error.redirect_to.as_deref(), Some("/posts/9/"));

        let error: ApiError = PostServiceError::InternalError(anyhow::anyhow!("db down")).into();
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_comment_denial_redirects_to_post() {
        let error: ApiError = CommentServiceError::PermissionDenied { post_id: 3 }.into();
        assert_eq!(error.redirect_to.as_deref(), Some("/posts/3/"));
    }

    #[test]
    fn test_conflicts() {
        let error: ApiError = CategoryServiceError::DuplicateSlug("news".into()).into();
        assert_eq!(error.status(), StatusCode::CONFLICT);
        assert_eq!(error.error.details, Some(serde_json::json!({ "slug": "news" })));

        let error: ApiError = UserServiceError::UserExists("alice".into()).into();
        assert_eq!(error.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_authentication_error_hides_reason() {
        let error: ApiError = UserServiceError::AuthenticationError("no such user".into()).into();
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
        assert!(!error.error.message.contains("no such user"));
    }
}
