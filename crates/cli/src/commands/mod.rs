//! CLI command implementations.

pub mod cart;
pub mod migrate;

use thiserror::Error;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] tualmi_storefront::config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("cart error: {0}")]
    Store(#[from] tualmi_storefront::store::CartStoreError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
