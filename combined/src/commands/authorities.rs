//! Authorities command - show what a username is granted.

use common::AppResult;
use security_service_lib::service::UserRepository;

use super::connect;

pub async fn execute(username: &str) -> AppResult<()> {
    let services = connect().await?;

    let authorities = services.user_repository.resolve_authorities(username).await?;
    if authorities.is_empty() {
        println!("No authorities for '{}'", username);
    }
    for authority in authorities {
        println!("{}\t{}", authority.authority(), authority.role().name);
    }

    Ok(())
}
