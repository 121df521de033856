//! User service
//!
//! Registration, login/logout, session validation and profile edits.
//! The first user to register becomes an administrator.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Session, UpdateProfileInput, User, UserRole};
use crate::policy::clock::Clock;
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use uuid::Uuid;

/// Sessions last a week, matching the cookie's Max-Age
pub const SESSION_LIFETIME_DAYS: i64 = 7;

const USERNAME_MAX_LEN: usize = 150;
const PASSWORD_MIN_LEN: usize = 8;
const NAME_MAX_LEN: usize = 150;

/// Letters, digits and `@ . + - _`
static USERNAME_RE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$"));

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            clock,
        }
    }

    /// Register a user and log them in.
    ///
    /// # Errors
    /// - `ValidationError` for a bad username, email or password
    /// - `UserExists` if the username is taken
    pub async fn register(&self, mut input: CreateUserInput) -> Result<(User, Session), UserServiceError> {
        input.username = input.username.trim().to_string();
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        validate_name(&input.first_name, "First name")?;
        validate_name(&input.last_name, "Last name")?;
        if input.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(UserServiceError::ValidationError(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN_LEN
            )));
        }

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        let password_hash = hash_password(&input.password)?;
        let now = self.clock.now();
        let mut user = User::new(
            input.username,
            input.email.trim().to_string(),
            password_hash,
            UserRole::Author,
        );
        user.first_name = input.first_name.trim().to_string();
        user.last_name = input.last_name.trim().to_string();
        user.created_at = now;
        user.updated_at = now;

        let user = self
            .user_repo
            .create_registered(&user)
            .await
            .context("Failed to create user")?;
        tracing::info!("Registered user {} ({})", user.username, user.role);

        let session = self.create_session(user.id).await?;
        Ok((user, session))
    }

    /// Check credentials and open a new session.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, Session), UserServiceError> {
        let invalid = || UserServiceError::AuthenticationError("Invalid username or password".to_string());

        let user = self
            .user_repo
            .get_by_username(username.trim())
            .await
            .context("Failed to get user by username")?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        let session = self.create_session(user.id).await?;
        Ok((user, session))
    }

    /// Invalidate a session token. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted on sight and treated as absent.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let Some(session) = self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        else {
            return Ok(None);
        };

        if session.is_expired_at(self.clock.now()) {
            self.session_repo
                .delete(token)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.user_repo.get_by_id(id).await.context("Failed to get user by ID")?)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?)
    }

    /// Edit the caller's own profile. Absent fields stay unchanged.
    pub async fn update_profile(&self, user: &User, input: UpdateProfileInput) -> Result<User, UserServiceError> {
        let mut updated = user.clone();

        if let Some(username) = input.username {
            let username = username.trim().to_string();
            validate_username(&username)?;
            if username != user.username
                && self
                    .user_repo
                    .get_by_username(&username)
                    .await
                    .context("Failed to check username")?
                    .is_some()
            {
                return Err(UserServiceError::UserExists(format!(
                    "Username '{}' is already taken",
                    username
                )));
            }
            updated.username = username;
        }
        if let Some(email) = input.email {
            validate_email(&email)?;
            updated.email = email.trim().to_string();
        }
        if let Some(first_name) = input.first_name {
            validate_name(&first_name, "First name")?;
            updated.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = input.last_name {
            validate_name(&last_name, "Last name")?;
            updated.last_name = last_name.trim().to_string();
        }
        updated.updated_at = self.clock.now();

        Ok(self
            .user_repo
            .update(&updated)
            .await
            .context("Failed to update user")?)
    }

    /// Delete every session that has expired. Returns how many were removed.
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        Ok(self
            .session_repo
            .delete_expired(self.clock.now())
            .await
            .context("Failed to delete expired sessions")?)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let now = self.clock.now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + Duration::days(SESSION_LIFETIME_DAYS),
            created_at: now,
        };

        Ok(self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?)
    }
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(UserServiceError::ValidationError("Username cannot be empty".to_string()));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(UserServiceError::ValidationError(format!(
            "Username must be at most {} characters",
            USERNAME_MAX_LEN
        )));
    }
    let pattern = USERNAME_RE
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Invalid username pattern: {}", e))?;
    if !pattern.is_match(username) {
        return Err(UserServiceError::ValidationError(
            "Username may contain only letters, digits and @/./+/-/_".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    let email = email.trim();
    if !email.is_empty() && !email.contains('@') {
        return Err(UserServiceError::ValidationError("Invalid email format".to_string()));
    }
    Ok(())
}

fn validate_name(name: &str, field: &str) -> Result<(), UserServiceError> {
    if name.trim().chars().count() > NAME_MAX_LEN {
        return Err(UserServiceError::ValidationError(format!(
            "{} must be at most {} characters",
            field, NAME_MAX_LEN
        )));
    }
    Ok(())
}
