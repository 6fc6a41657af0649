use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GameRestriction::Table)
                    .if_not_exists()
                    .col(pk_auto(GameRestriction::Id))
                    .col(string(GameRestriction::GuildId))
                    .col(string(GameRestriction::Game))
                    .col(string(GameRestriction::ChannelId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_restriction_guild_game_channel")
                    .table(GameRestriction::Table)
                    .col(GameRestriction::GuildId)
                    .col(GameRestriction::Game)
                    .col(GameRestriction::ChannelId)
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
                    .name("idx_game_restriction_guild_game_channel")
                    .table(GameRestriction::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(GameRestriction::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GameRestriction {
    Table,
    Id,
    GuildId,
    Game,
    ChannelId,
}
