use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::UserId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SearchHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchHistory::SearchId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchHistory::UserId).integer().not_null())
                    .col(ColumnDef::new(SearchHistory::PlaceName).string().not_null())
                    .col(ColumnDef::new(SearchHistory::Address).string().not_null())
                    .col(
                        ColumnDef::new(SearchHistory::Timestamp)
                            .string()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_owned()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_search_history_user")
                            .from(SearchHistory::Table, SearchHistory::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchHistory::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    UserId,
    Username,
    Password,
}

#[derive(Iden)]
enum SearchHistory {
    Table,
    SearchId,
    UserId,
    PlaceName,
    Address,
    Timestamp,
}
