//! `SeaORM` implementation of the `HistoryService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SearchConfig;
use crate::constants::limits::MAX_POPULAR_LIMIT;
use crate::db::{HistoryEntryInput, HistoryRecord, PopularSearch, Store};
use crate::services::history_service::{HistoryError, HistoryService};

pub struct SeaOrmHistoryService {
    store: Store,
    search: SearchConfig,
}

impl SeaOrmHistoryService {
    #[must_use]
    pub const fn new(store: Store, search: SearchConfig) -> Self {
        Self { store, search }
    }
}

#[async_trait]
impl HistoryService for SeaOrmHistoryService {
    async fn record_places(
        &self,
        user_id: i32,
        entries: &[HistoryEntryInput],
    ) -> Result<u64, HistoryError> {
        let written = self
            .store
            .save_history(user_id, entries)
            .await?
            .ok_or(HistoryError::UserNotFound)?;

        if written > 0 {
            metrics::counter!("history_records_saved_total").increment(written);
        }

        Ok(written)
    }

    async fn get_history(&self, user_id: i32) -> Result<Vec<HistoryRecord>, HistoryError> {
        Ok(self.store.get_history(user_id).await?)
    }

    async fn top_searches(
        &self,
        user_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<PopularSearch>, HistoryError> {
        let limit = limit.unwrap_or(self.search.popular_limit);
        if !(1..=MAX_POPULAR_LIMIT).contains(&limit) {
            return Err(HistoryError::Validation(format!(
                "limit must be between 1 and {MAX_POPULAR_LIMIT}"
            )));
        }

        Ok(self.store.top_searches(user_id, limit).await?)
    }

    async fn search_by_keyword(
        &self,
        user_id: i32,
        keyword: &str,
    ) -> Result<Vec<HistoryRecord>, HistoryError> {
        let keyword = keyword.trim();
        if keyword.chars().count() < self.search.min_keyword_length {
            return Err(HistoryError::Validation(format!(
                "keyword is too short ({}+ characters needed)",
                self.search.min_keyword_length
            )));
        }

        Ok(self.store.search_history(user_id, keyword).await?)
    }

    async fn delete_account(&self, user_id: i32) -> Result<(), HistoryError> {
        if !self.store.delete_user(user_id).await? {
            return Err(HistoryError::UserNotFound);
        }

        info!(user_id, "Deleted account and search history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;

    async fn service_with_user() -> (SeaOrmHistoryService, i32) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();

        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let user = store
            .create_user("traveller", "password123", &security)
            .await
            .unwrap()
            .unwrap();

        (
            SeaOrmHistoryService::new(store, SearchConfig::default()),
            user.user_id,
        )
    }

    fn entry(name: &str, address: &str) -> HistoryEntryInput {
        HistoryEntryInput {
            place_name: name.to_string(),
            address: address.to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_for_missing_user_is_rejected() {
        let (service, user_id) = service_with_user().await;

        let err = service
            .record_places(user_id + 1, &[entry("Cafe", "1 Main St")])
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::UserNotFound));

        assert!(service.get_history(user_id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keyword_is_trimmed_and_length_checked() {
        let (service, user_id) = service_with_user().await;
        service
            .record_places(user_id, &[entry("Blue Bottle", "1 Main St")])
            .await
            .unwrap();

        assert!(matches!(
            service.search_by_keyword(user_id, " b ").await,
            Err(HistoryError::Validation(_))
        ));

        let found = service.search_by_keyword(user_id, "  blue ").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_popular_limit_bounds() {
        let (service, user_id) = service_with_user().await;

        assert!(matches!(
            service.top_searches(user_id, Some(0)).await,
            Err(HistoryError::Validation(_))
        ));
        assert!(matches!(
            service.top_searches(user_id, Some(101)).await,
            Err(HistoryError::Validation(_))
        ));
        assert!(service.top_searches(user_id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_account_twice() {
        let (service, user_id) = service_with_user().await;

        service.delete_account(user_id).await.unwrap();
        assert!(matches!(
            service.delete_account(user_id).await,
            Err(HistoryError::UserNotFound)
        ));
    }
}
