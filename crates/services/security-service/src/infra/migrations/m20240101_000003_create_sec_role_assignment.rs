//! Migration: Create the table assigning role codes to usernames.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SecRoleAssignment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SecRoleAssignment::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SecRoleAssignment::Username)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SecRoleAssignment::RoleCode)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SecRoleAssignment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Role codes are not foreign keys: assignments may outlive their role
        manager
            .create_index(
                Index::create()
                    .name("uq_sec_role_assignment_username_role")
                    .table(SecRoleAssignment::Table)
                    .col(SecRoleAssignment::Username)
                    .col(SecRoleAssignment::RoleCode)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SecRoleAssignment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SecRoleAssignment {
    Table,
    Id,
    Username,
    RoleCode,
    CreatedAt,
}
