use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Every history query filters on the owning user
        manager
            .create_index(
                Index::create()
                    .name("idx_search_history_user_id")
                    .table(SearchHistory::Table)
                    .col(SearchHistory::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_search_history_user_id")
                    .table(SearchHistory::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum SearchHistory {
    Table,
    UserId,
}
