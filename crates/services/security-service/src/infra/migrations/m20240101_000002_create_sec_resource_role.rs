//! Migration: Create the table of database-defined roles.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SecResourceRole::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SecResourceRole::Code)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SecResourceRole::Name).string().not_null())
                    .col(ColumnDef::new(SecResourceRole::Description).text().null())
                    .col(
                        ColumnDef::new(SecResourceRole::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SecResourceRole::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SecResourceRole {
    Table,
    Code,
    Name,
    Description,
    CreatedAt,
}
