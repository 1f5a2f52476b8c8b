//! Migrate command - database migration management.

use crate::cli::MigrateAction;

pub async fn execute(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let action = match action {
        MigrateAction::Up => security_service_lib::MigrateAction::Up,
        MigrateAction::Down => security_service_lib::MigrateAction::Down,
        MigrateAction::Status => security_service_lib::MigrateAction::Status,
        MigrateAction::Fresh => {
            tracing::warn!("Resetting database and running all migrations...");
            security_service_lib::MigrateAction::Fresh
        }
    };

    security_service_lib::run_migrations(action).await
}
