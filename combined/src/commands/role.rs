//! Role command - role definitions and assignments.

use common::AppResult;
use security_service_lib::repository::{RoleAssignmentRepository, RoleRepository};

use super::connect;
use crate::cli::RoleAction;

pub async fn execute(action: RoleAction) -> AppResult<()> {
    let services = connect().await?;

    match action {
        RoleAction::Create {
            code,
            name,
            description,
        } => {
            let role = services.role_store.create(&code, &name, description).await?;
            println!("{} ({})", role.code, role.name);
        }
        RoleAction::Assign { username, code } => {
            if services.roles.get_role_by_code(&code).await?.is_none() {
                tracing::warn!(role_code = %code, "Assigning a role that is not defined");
            }
            services.assignments.assign(&username, &code).await?;
        }
        RoleAction::Revoke { username, code } => {
            services.assignments.revoke(&username, &code).await?;
        }
        RoleAction::List => {
            for role in services.roles.all_roles().await? {
                println!(
                    "{:<24} {:<10} {}",
                    role.code,
                    role.source.to_string(),
                    role.description.as_deref().unwrap_or(&role.name)
                );
            }
        }
    }

    Ok(())
}
