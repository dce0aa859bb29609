use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};

/// User data returned from repository (without the password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i32,
    pub username: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            user_id: model.user_id,
            username: model.username,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Hashes the password and inserts the user.
    /// Returns `None` if the username is already taken.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        let password = password.to_string();
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;

        let active_model = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            ..Default::default()
        };

        match Users::insert(active_model).exec(&self.conn).await {
            Ok(result) => Ok(Some(User {
                user_id: result.last_insert_id,
                username: username.to_string(),
            })),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    pub async fn get_by_id(&self, user_id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Returns the user when the password matches the stored hash.
    /// Verification runs on a blocking thread; Argon2 is CPU-bound.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the argon2 crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash. Params are read from the hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {e}")),
    }
}
