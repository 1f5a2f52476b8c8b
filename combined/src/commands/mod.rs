//! CLI command implementations, one module per command.

pub mod authorities;
pub mod expand;
pub mod migrate;
pub mod role;
pub mod user;

use common::AppResult;
use security_service_lib::config::SecurityServiceConfig;
use security_service_lib::SecurityServices;

/// Connect to the security database configured in the environment.
pub(crate) async fn connect() -> AppResult<SecurityServices> {
    SecurityServices::connect(&SecurityServiceConfig::from_env()).await
}
