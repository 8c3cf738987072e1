use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Itinerary: owner lookups drive the dashboard list.
        manager
            .create_index(
                Index::create()
                    .name("idx_itinerary_user")
                    .table(Itinerary::Table)
                    .col(Itinerary::UserId)
                    .to_owned(),
            )
            .await?;

        // Credentials: one row per user.
        manager
            .create_index(
                Index::create()
                    .name("uniq_user_credentials_user")
                    .table(UserCredentials::Table)
                    .col(UserCredentials::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_itinerary_user").table(Itinerary::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("uniq_user_credentials_user")
                    .table(UserCredentials::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Itinerary { Table, UserId }

#[derive(DeriveIden)]
enum UserCredentials { Table, UserId }
