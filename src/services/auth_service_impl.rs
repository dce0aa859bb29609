//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::services::auth_service::{AuthError, AuthService, UserInfo};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, username: &str, password: &str) -> Result<UserInfo, AuthError> {
        let username = username.trim();

        if username.chars().count() < self.security.min_username_length {
            return Err(AuthError::Validation(format!(
                "Username must be at least {} characters",
                self.security.min_username_length
            )));
        }

        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }

        let user = self
            .store
            .create_user(username, password, &self.security)
            .await?
            .ok_or(AuthError::UsernameTaken)?;

        info!(user_id = user.user_id, username = %user.username, "Registered user");
        Ok(user.into())
    }

    async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .verify_user_credentials(username, password)
            .await?
            .map(UserInfo::from)
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn get_user_info(&self, user_id: i32) -> Result<UserInfo, AuthError> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .map(UserInfo::from)
            .ok_or(AuthError::UserNotFound)
    }

    async fn find_by_username(&self, username: &str) -> Result<UserInfo, AuthError> {
        self.store
            .get_user_by_username(username.trim())
            .await?
            .map(UserInfo::from)
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmAuthService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        SeaOrmAuthService::new(
            store,
            SecurityConfig {
                argon2_memory_cost_kib: 1024,
                argon2_time_cost: 1,
                ..SecurityConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_register_validates_lengths() {
        let service = service().await;

        assert!(matches!(
            service.register("ab", "password123").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            service.register("  ab  ", "password123").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            service.register("traveller", "short").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service().await;

        let user = service.register(" traveller ", "password123").await.unwrap();
        assert_eq!(user.username, "traveller");

        let err = service.register("traveller", "password456").await.unwrap_err();
        assert_eq!(err.to_string(), "Username already exists - try another");

        assert_eq!(service.login("traveller", "password123").await.unwrap(), user);

        let err = service.login("traveller", "wrong-pass").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
        assert!(matches!(
            service.login("nobody", "password123").await,
            Err(AuthError::InvalidCredentials)
        ));

        assert_eq!(service.get_user_info(user.user_id).await.unwrap(), user);
        assert_eq!(service.find_by_username("traveller").await.unwrap(), user);
        assert!(matches!(
            service.get_user_info(user.user_id + 1).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
