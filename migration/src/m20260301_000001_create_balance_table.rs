use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Balance::Table)
                    .if_not_exists()
                    .col(pk_auto(Balance::Id))
                    .col(string(Balance::UserId))
                    .col(string(Balance::GuildId))
                    .col(big_integer(Balance::Coins).default(1000))
                    .col(big_integer(Balance::TotalEarned).default(0))
                    .col(timestamp_null(Balance::LastDaily))
                    .to_owned(),
            )
            .await?;

        // One ledger row per member of a guild
        manager
            .create_index(
                Index::create()
                    .name("idx_balance_user_guild")
                    .table(Balance::Table)
                    .col(Balance::UserId)
                    .col(Balance::GuildId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_balance_user_guild")
                    .table(Balance::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Balance::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Balance {
    Table,
    Id,
    UserId,
    GuildId,
    Coins,
    TotalEarned,
    LastDaily,
}
