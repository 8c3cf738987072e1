//! Create `itinerary` table with FK to `user`.
//!
//! Locations are embedded as a JSONB array; they have no identity of their own.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Itinerary::Table)
                    .if_not_exists()
                    .col(uuid(Itinerary::Id).primary_key())
                    .col(uuid(Itinerary::UserId).not_null())
                    .col(string_len(Itinerary::Title, 256).not_null())
                    .col(text_null(Itinerary::Description))
                    .col(date(Itinerary::StartDate).not_null())
                    .col(date(Itinerary::EndDate).not_null())
                    .col(json_binary(Itinerary::Locations).not_null())
                    .col(timestamp_with_time_zone(Itinerary::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Itinerary::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_itinerary_user")
                            .from(Itinerary::Table, Itinerary::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Itinerary::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Itinerary { Table, Id, UserId, Title, Description, StartDate, EndDate, Locations, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
