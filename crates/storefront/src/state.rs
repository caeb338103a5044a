//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::store::{CartStore, PgDocumentStore};
use crate::stripe::{LogFulfillment, StripeClient, WebhookHandler};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// cart store, gateway client, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    cart: CartStore,
    gateway: StripeClient,
    webhooks: WebhookHandler,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The cart store persists to `PostgreSQL` under the configured storage
    /// key; the webhook handler dispatches to the logging fulfillment hook.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let backend = Arc::new(PgDocumentStore::new(pool.clone()));
        let cart = CartStore::new(backend, config.cart_storage_key.clone());
        let gateway = StripeClient::new(&config.stripe, &config.client_url);
        let webhooks = WebhookHandler::new(
            config.stripe.webhook_secret.clone(),
            Arc::new(LogFulfillment),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                cart,
                gateway,
                webhooks,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the checkout gateway client.
    #[must_use]
    pub fn gateway(&self) -> &StripeClient {
        &self.inner.gateway
    }

    /// Get a reference to the webhook handler.
    #[must_use]
    pub fn webhooks(&self) -> &WebhookHandler {
        &self.inner.webhooks
    }
}
