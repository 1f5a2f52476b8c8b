//! Migration: Create the user table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SecUser::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SecUser::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SecUser::Username).string_len(255).not_null())
                    .col(ColumnDef::new(SecUser::PasswordHash).string().not_null())
                    .col(ColumnDef::new(SecUser::FirstName).string().null())
                    .col(ColumnDef::new(SecUser::LastName).string().null())
                    .col(ColumnDef::new(SecUser::Email).string().null())
                    .col(
                        ColumnDef::new(SecUser::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(SecUser::TimeZoneId).string().null())
                    .col(
                        ColumnDef::new(SecUser::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SecUser::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Not unique: legacy data may hold several rows per username
        manager
            .create_index(
                Index::create()
                    .name("idx_sec_user_username")
                    .table(SecUser::Table)
                    .col(SecUser::Username)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SecUser::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SecUser {
    Table,
    Id,
    Username,
    PasswordHash,
    FirstName,
    LastName,
    Email,
    Active,
    TimeZoneId,
    CreatedAt,
    UpdatedAt,
}
