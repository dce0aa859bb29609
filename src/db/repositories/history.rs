use crate::entities::{prelude::*, search_history};
use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;

/// One place to record against a user's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntryInput {
    pub place_name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub search_id: i32,
    pub place_name: String,
    pub address: String,
    pub timestamp: String,
}

impl From<search_history::Model> for HistoryRecord {
    fn from(model: search_history::Model) -> Self {
        Self {
            search_id: model.search_id,
            place_name: model.place_name,
            address: model.address,
            timestamp: model.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct PopularSearch {
    pub place_name: String,
    pub address: String,
    pub search_count: i64,
}

pub struct HistoryRepository {
    conn: DatabaseConnection,
}

impl HistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts one row per entry, all stamped with the same insertion time.
    ///
    /// Returns `Ok(None)` without writing anything when the user does not exist.
    /// An empty `entries` slice is a no-op and never touches the database.
    pub async fn save(&self, user_id: i32, entries: &[HistoryEntryInput]) -> Result<Option<u64>> {
        if entries.is_empty() {
            return Ok(Some(0));
        }

        let txn = self.conn.begin().await?;

        let user = Users::find_by_id(user_id)
            .one(&txn)
            .await
            .context("Failed to check history owner")?;
        if user.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let models = entries.iter().map(|entry| search_history::ActiveModel {
            user_id: Set(user_id),
            place_name: Set(entry.place_name.clone()),
            address: Set(entry.address.clone()),
            timestamp: Set(now.clone()),
            ..Default::default()
        });

        SearchHistory::insert_many(models)
            .exec_without_returning(&txn)
            .await
            .context("Failed to insert search history")?;

        txn.commit().await?;

        Ok(Some(entries.len() as u64))
    }

    /// All of the user's records in insertion order.
    pub async fn get_all(&self, user_id: i32) -> Result<Vec<HistoryRecord>> {
        let rows = SearchHistory::find()
            .filter(search_history::Column::UserId.eq(user_id))
            .order_by_asc(search_history::Column::SearchId)
            .all(&self.conn)
            .await
            .context("Failed to load search history")?;

        Ok(rows.into_iter().map(HistoryRecord::from).collect())
    }

    /// Groups by (place name, address) and ranks by occurrence count.
    /// Equal counts are ordered by place name, then address.
    pub async fn top_searches(&self, user_id: i32, limit: u64) -> Result<Vec<PopularSearch>> {
        let rows = SearchHistory::find()
            .select_only()
            .column(search_history::Column::PlaceName)
            .column(search_history::Column::Address)
            .column_as(
                Expr::col(search_history::Column::SearchId).count(),
                "search_count",
            )
            .filter(search_history::Column::UserId.eq(user_id))
            .group_by(search_history::Column::PlaceName)
            .group_by(search_history::Column::Address)
            .order_by_desc(Expr::cust("search_count"))
            .order_by_asc(search_history::Column::PlaceName)
            .order_by_asc(search_history::Column::Address)
            .limit(limit)
            .into_model::<PopularSearch>()
            .all(&self.conn)
            .await
            .context("Failed to rank popular searches")?;

        Ok(rows)
    }

    /// Case-insensitive substring match on place name or address.
    ///
    /// Filtering happens after loading the user's rows: SQLite's `LIKE` and
    /// `LOWER` only fold ASCII.
    pub async fn search_by_keyword(&self, user_id: i32, keyword: &str) -> Result<Vec<HistoryRecord>> {
        let needle = keyword.to_lowercase();

        let records = self
            .get_all(user_id)
            .await?
            .into_iter()
            .filter(|r| {
                r.place_name.to_lowercase().contains(&needle)
                    || r.address.to_lowercase().contains(&needle)
            })
            .collect();

        Ok(records)
    }

    /// Removes the user's history, then the user, in one transaction.
    pub async fn delete_user(&self, user_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let user = Users::find_by_id(user_id)
            .one(&txn)
            .await
            .context("Failed to look up user for deletion")?;
        if user.is_none() {
            return Ok(false);
        }

        SearchHistory::delete_many()
            .filter(search_history::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .context("Failed to delete search history")?;

        Users::delete_by_id(user_id)
            .exec(&txn)
            .await
            .context("Failed to delete user")?;

        txn.commit().await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::Store;

    async fn setup() -> (Store, i32) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();

        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let user = store
            .create_user("testuser", "password123", &security)
            .await
            .unwrap()
            .unwrap();

        (store, user.user_id)
    }

    fn entry(name: &str, address: &str) -> HistoryEntryInput {
        HistoryEntryInput {
            place_name: name.to_string(),
            address: address.to_string(),
        }
    }

    const EIFFEL: &str = "Champ de Mars, 5 Avenue Anatole France, 75007 Paris, France";
    const LOUVRE: &str = "Rue de Rivoli, 75001 Paris, France";

    #[tokio::test]
    async fn save_writes_one_record_per_place() {
        let (store, user_id) = setup().await;
        let repo = HistoryRepository::new(store.conn.clone());

        let written = repo
            .save(
                user_id,
                &[
                    entry("Eiffel Tower", EIFFEL),
                    entry("Louvre Museum", LOUVRE),
                    entry("Eiffel Tower", EIFFEL),
                ],
            )
            .await
            .unwrap();
        assert_eq!(written, Some(3));

        let history = repo.get_all(user_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].place_name, "Eiffel Tower");
        assert_eq!(history[0].address, EIFFEL);
        assert_eq!(history[1].place_name, "Louvre Museum");
        assert_eq!(history[1].address, LOUVRE);
        assert!(!history[0].timestamp.is_empty());
    }

    #[tokio::test]
    async fn save_with_no_places_is_a_noop() {
        let (store, user_id) = setup().await;
        let repo = HistoryRepository::new(store.conn.clone());

        assert_eq!(repo.save(user_id, &[]).await.unwrap(), Some(0));
        assert!(repo.get_all(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_for_unknown_user_writes_nothing() {
        let (store, user_id) = setup().await;
        let repo = HistoryRepository::new(store.conn.clone());

        let written = repo
            .save(user_id + 100, &[entry("Eiffel Tower", EIFFEL)])
            .await
            .unwrap();
        assert_eq!(written, None);
        assert!(repo.get_all(user_id + 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn top_searches_ranks_by_count() {
        let (store, user_id) = setup().await;
        let repo = HistoryRepository::new(store.conn.clone());

        repo.save(
            user_id,
            &[
                entry("Louvre Museum", LOUVRE),
                entry("Eiffel Tower", EIFFEL),
                entry("Louvre Museum", LOUVRE),
                entry("Eiffel Tower", EIFFEL),
                entry("Eiffel Tower", EIFFEL),
                entry("Arc de Triomphe", "Place Charles de Gaulle, 75008 Paris, France"),
            ],
        )
        .await
        .unwrap();

        let popular = repo.top_searches(user_id, 10).await.unwrap();
        assert_eq!(popular.len(), 3);
        assert_eq!(popular[0].place_name, "Eiffel Tower");
        assert_eq!(popular[0].search_count, 3);
        assert_eq!(popular[1].place_name, "Louvre Museum");
        assert_eq!(popular[1].search_count, 2);
        assert_eq!(popular[2].search_count, 1);

        let limited = repo.top_searches(user_id, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].place_name, "Eiffel Tower");
    }

    #[tokio::test]
    async fn top_searches_breaks_ties_by_place_name() {
        let (store, user_id) = setup().await;
        let repo = HistoryRepository::new(store.conn.clone());

        repo.save(
            user_id,
            &[
                entry("Zoo", "1 Zoo Road"),
                entry("Aquarium", "2 Sea Lane"),
                entry("Museum", "3 Art Street"),
            ],
        )
        .await
        .unwrap();

        let names: Vec<String> = repo
            .top_searches(user_id, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.place_name)
            .collect();
        assert_eq!(names, vec!["Aquarium", "Museum", "Zoo"]);
    }

    #[tokio::test]
    async fn keyword_search_is_case_insensitive_over_name_and_address() {
        let (store, user_id) = setup().await;
        let repo = HistoryRepository::new(store.conn.clone());

        repo.save(
            user_id,
            &[
                entry("Eiffel Tower", EIFFEL),
                entry("Louvre Museum", LOUVRE),
                entry("Café de Flore", "172 Boulevard Saint-Germain, Paris"),
                entry("British Museum", "Great Russell St, London"),
            ],
        )
        .await
        .unwrap();

        let museums = repo.search_by_keyword(user_id, "MUSEUM").await.unwrap();
        assert_eq!(museums.len(), 2);
        assert_eq!(museums[0].place_name, "Louvre Museum");
        assert_eq!(museums[1].place_name, "British Museum");

        let by_address = repo.search_by_keyword(user_id, "rivoli").await.unwrap();
        assert_eq!(by_address.len(), 1);
        assert_eq!(by_address[0].place_name, "Louvre Museum");

        let unicode = repo.search_by_keyword(user_id, "CAFÉ").await.unwrap();
        assert_eq!(unicode.len(), 1);

        assert!(repo.search_by_keyword(user_id, "tokyo").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_scoped_to_its_owner() {
        let (store, user_id) = setup().await;
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let other = store
            .create_user("otheruser", "password123", &security)
            .await
            .unwrap()
            .unwrap();
        let repo = HistoryRepository::new(store.conn.clone());

        repo.save(user_id, &[entry("Eiffel Tower", EIFFEL)]).await.unwrap();
        repo.save(other.user_id, &[entry("Louvre Museum", LOUVRE)])
            .await
            .unwrap();

        let mine = repo.get_all(user_id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].place_name, "Eiffel Tower");
        assert!(repo.search_by_keyword(user_id, "louvre").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_user_removes_history_and_user() {
        let (store, user_id) = setup().await;
        let repo = HistoryRepository::new(store.conn.clone());

        repo.save(user_id, &[entry("Eiffel Tower", EIFFEL)]).await.unwrap();
        assert_eq!(repo.get_all(user_id).await.unwrap().len(), 1);

        assert!(repo.delete_user(user_id).await.unwrap());
        assert!(repo.get_all(user_id).await.unwrap().is_empty());
        assert!(store.get_user_by_id(user_id).await.unwrap().is_none());

        assert!(!repo.delete_user(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn foreign_key_cascades_and_rejects_orphans() {
        use sea_orm::{ConnectionTrait, DbBackend, Statement};

        let (store, user_id) = setup().await;
        let repo = HistoryRepository::new(store.conn.clone());

        repo.save(
            user_id,
            &[entry("Eiffel Tower", EIFFEL), entry("Louvre Museum", LOUVRE)],
        )
        .await
        .unwrap();

        // Bypass the repository so only the schema does the cleanup
        store
            .conn
            .execute(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                "DELETE FROM users WHERE user_id = ?",
                [user_id.into()],
            ))
            .await
            .unwrap();
        assert!(repo.get_all(user_id).await.unwrap().is_empty());

        let orphan = store
            .conn
            .execute(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                "INSERT INTO search_history (user_id, place_name, address, timestamp) \
                 VALUES (?, 'Louvre Museum', ?, '2026-01-01T00:00:00Z')",
                [(user_id + 1000).into(), LOUVRE.into()],
            ))
            .await;
        assert!(orphan.is_err());
    }
}
