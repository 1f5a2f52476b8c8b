//! Security service configuration.

use std::env;

use common::DatabaseConfig;

/// Security service configuration.
#[derive(Debug, Clone)]
pub struct SecurityServiceConfig {
    /// Database holding users, roles and role assignments
    pub database: DatabaseConfig,
    /// Apply pending migrations when connecting
    pub auto_migrate: bool,
}

impl SecurityServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database: DatabaseConfig::from_env("SECURITY"),
            auto_migrate: env::var("SECURITY_AUTO_MIGRATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// In-memory SQLite configuration, for tests and demos.
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseConfig::in_memory(),
            auto_migrate: true,
        }
    }
}

impl Default for SecurityServiceConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            auto_migrate: true,
        }
    }
}
