//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod logging;
pub mod policy;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::policy::PolicyConfig;

use crate::error::AppError;

/// Root ledger configuration.
///
/// This struct is the top-level deserialization target for the merged TOML
/// configuration files (default.toml + environment overlay + `STAFFHUB__*`
/// environment variables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Concurrency and policy knobs for the ledger itself.
    #[serde(default)]
    pub ledger: PolicyConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LedgerConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default.toml`, an optional `config/{env}.toml`
    /// overlay, and `STAFFHUB__`-prefixed environment variables (double
    /// underscore as section separator).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("STAFFHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
