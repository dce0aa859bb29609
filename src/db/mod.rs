use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::history::{HistoryEntryInput, HistoryRecord, PopularSearch};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    /// Connects with the default pool size. Does not touch the schema; call
    /// [`Store::migrate`] once before serving traffic.
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if in_memory {
            // Each SQLite connection to :memory: is its own database.
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        info!(
            "Database connected (pool: {}-{})",
            if in_memory { 1 } else { min_connections },
            if in_memory { 1 } else { max_connections }
        );

        Ok(Self { conn })
    }

    /// Applies pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        use sea_orm_migration::MigratorTrait;

        migrator::Migrator::up(&self.conn, None)
            .await
            .context("Failed to apply migrations")?;

        info!("Database migrations applied");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn history_repo(&self) -> repositories::history::HistoryRepository {
        repositories::history::HistoryRepository::new(self.conn.clone())
    }

    // Users

    /// Returns `None` when the username is already taken.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo().create(username, password, security).await
    }

    pub async fn get_user_by_id(&self, user_id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(user_id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_credentials(username, password).await
    }

    // Search history

    /// Returns `None` when the user does not exist; nothing is written then.
    pub async fn save_history(
        &self,
        user_id: i32,
        entries: &[HistoryEntryInput],
    ) -> Result<Option<u64>> {
        self.history_repo().save(user_id, entries).await
    }

    pub async fn get_history(&self, user_id: i32) -> Result<Vec<HistoryRecord>> {
        self.history_repo().get_all(user_id).await
    }

    pub async fn top_searches(&self, user_id: i32, limit: u64) -> Result<Vec<PopularSearch>> {
        self.history_repo().top_searches(user_id, limit).await
    }

    pub async fn search_history(&self, user_id: i32, keyword: &str) -> Result<Vec<HistoryRecord>> {
        self.history_repo().search_by_keyword(user_id, keyword).await
    }

    /// Deletes the user's history and then the user. `false` if no such user.
    pub async fn delete_user(&self, user_id: i32) -> Result<bool> {
        self.history_repo().delete_user(user_id).await
    }
}
