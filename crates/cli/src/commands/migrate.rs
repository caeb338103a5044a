//! Database migration command.

use std::path::Path;

use sqlx::migrate::Migrator;

use tualmi_storefront::config::StorefrontConfig;
use tualmi_storefront::db;

use super::CliError;

const MIGRATIONS_DIR: &str = "crates/storefront/migrations";

/// Run pending storefront migrations.
pub async fn run() -> Result<(), CliError> {
    let config = StorefrontConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;

    let migrator = Migrator::new(Path::new(MIGRATIONS_DIR)).await?;
    migrator.run(&pool).await?;

    tracing::info!("Migrations applied");
    Ok(())
}
