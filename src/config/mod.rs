mod bootstrap_settings;
mod config_spec;
pub mod database;
mod env_provider;
pub mod errors;
mod logging;
mod secret_config;
mod secret_manager;

pub use bootstrap_settings::BootstrapSettings;
pub use config_spec::{ConfigSpec, ConfigValue, ConfigValueSource};
pub use database::{close_database, init_database, migrate_database};
pub use env_provider::{EnvironmentProvider, SystemEnvironment};
#[cfg(test)]
pub use env_provider::MockEnvironment;
pub use errors::ApplicationError;
pub use logging::{LoggingConfig, LoggingError, init_logging};
pub use secret_config::{SecretConfig, SecretType};
pub use secret_manager::{PaymentKeys, SecretError, SecretManager};
