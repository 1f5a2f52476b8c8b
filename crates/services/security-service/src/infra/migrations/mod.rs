//! Database migrations.
//!
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_sec_user;
mod m20240101_000002_create_sec_resource_role;
mod m20240101_000003_create_sec_role_assignment;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_sec_user::Migration),
            Box::new(m20240101_000002_create_sec_resource_role::Migration),
            Box::new(m20240101_000003_create_sec_role_assignment::Migration),
        ]
    }
}
