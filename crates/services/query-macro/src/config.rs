//! Query macro configuration.

use std::env;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Query macro configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryMacroConfig {
    /// Zone used by bindings whose macro did not name one
    pub default_time_zone: Tz,
}

impl QueryMacroConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let default_time_zone = match env::var("QUERY_MACRO_DEFAULT_TIMEZONE") {
            Ok(value) => value.trim().parse::<Tz>().unwrap_or_else(|_| {
                warn!(value = %value, "Unknown QUERY_MACRO_DEFAULT_TIMEZONE, using UTC");
                defaults.default_time_zone
            }),
            Err(_) => defaults.default_time_zone,
        };

        Self { default_time_zone }
    }

    pub fn with_time_zone(default_time_zone: Tz) -> Self {
        Self { default_time_zone }
    }
}

impl Default for QueryMacroConfig {
    fn default() -> Self {
        Self {
            default_time_zone: Tz::UTC,
        }
    }
}
