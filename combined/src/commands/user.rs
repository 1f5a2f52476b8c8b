//! User command - create, find and disable users.

use common::{AppError, AppResult};
use domain::{NewUser, UserResponse};
use security_service_lib::service::UserRepository;

use super::connect;
use crate::cli::{CreateUserArgs, UserAction};

pub async fn execute(action: UserAction) -> AppResult<()> {
    let services = connect().await?;

    match action {
        UserAction::Create(args) => {
            let user = services.users.create(new_user(args)).await?;
            print_user(&UserResponse::from(&user))?;
        }
        UserAction::Find { fragment } => {
            let users = services.user_repository.get_by_username_like(&fragment).await?;
            if users.is_empty() {
                println!("No users matching '{}'", fragment);
            }
            for user in &users {
                print_user(&UserResponse::from(user))?;
            }
        }
        UserAction::Disable { username } => {
            let user = services.user_repository.load_user_by_username(&username).await?;
            services.users.set_active(user.id, false).await?;
            tracing::info!(username = %username, "User disabled");
        }
    }

    Ok(())
}

fn new_user(args: CreateUserArgs) -> NewUser {
    let mut user = NewUser::new(args.username, args.password);
    user.first_name = args.first_name;
    user.last_name = args.last_name;
    user.email = args.email;
    user.time_zone_id = args.time_zone;
    user
}

fn print_user(user: &UserResponse) -> AppResult<()> {
    let json = serde_json::to_string(user).map_err(|e| AppError::internal(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
