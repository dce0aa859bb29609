//! Domain service for a user's search history and the views derived from it.

use thiserror::Error;

use crate::db::{HistoryEntryInput, HistoryRecord, PopularSearch};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for HistoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for HistoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait HistoryService: Send + Sync {
    /// Writes one record per place with a shared timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UserNotFound`] if the user does not exist;
    /// nothing is written in that case.
    async fn record_places(
        &self,
        user_id: i32,
        entries: &[HistoryEntryInput],
    ) -> Result<u64, HistoryError>;

    /// Every record of the user, oldest first.
    async fn get_history(&self, user_id: i32) -> Result<Vec<HistoryRecord>, HistoryError>;

    /// Most frequent (place, address) pairs. `None` uses the configured limit.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Validation`] if the limit is outside 1..=100.
    async fn top_searches(
        &self,
        user_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<PopularSearch>, HistoryError>;

    /// Records whose place name or address contains the keyword, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Validation`] if the trimmed keyword is too short.
    async fn search_by_keyword(
        &self,
        user_id: i32,
        keyword: &str,
    ) -> Result<Vec<HistoryRecord>, HistoryError>;

    /// Removes the user's history and then the user.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UserNotFound`] if there was no such user.
    async fn delete_account(&self, user_id: i32) -> Result<(), HistoryError>;
}
