//! Domain service for accounts: registration, login and account removal.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists - try another")]
    UsernameTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub user_id: i32,
    pub username: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account after checking username and password lengths.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] if the username is in use.
    async fn register(&self, username: &str, password: &str) -> Result<UserInfo, AuthError>;

    /// Verifies credentials and returns user info.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError>;

    async fn get_user_info(&self, user_id: i32) -> Result<UserInfo, AuthError>;

    async fn find_by_username(&self, username: &str) -> Result<UserInfo, AuthError>;
}
