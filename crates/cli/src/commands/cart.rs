//! Cart document management commands.

use std::sync::Arc;

use tualmi_storefront::config::StorefrontConfig;
use tualmi_storefront::db;
use tualmi_storefront::store::{CartStore, PgDocumentStore};

use super::CliError;

async fn open_store() -> Result<CartStore, CliError> {
    let config = StorefrontConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    Ok(CartStore::new(
        Arc::new(PgDocumentStore::new(pool)),
        config.cart_storage_key,
    ))
}

/// Print the stored cart as JSON.
#[allow(clippy::print_stdout)]
pub async fn show() -> Result<(), CliError> {
    let store = open_store().await?;
    let items = store.items().await;

    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

/// Delete the stored cart document.
pub async fn clear() -> Result<(), CliError> {
    let store = open_store().await?;
    store.clear().await?;

    tracing::info!("Cart document cleared");
    Ok(())
}
