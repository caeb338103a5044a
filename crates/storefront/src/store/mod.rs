//! Persistent cart store.
//!
//! All mutation funnels through read-full → mutate-in-memory → write-full
//! against a single document key. This keeps the distinct-variant-key
//! invariant trivial to uphold and avoids partial-write corruption; cart
//! documents are tens of lines, not millions.
//!
//! There is one logical writer per cart document and no locking. Two
//! contexts mutating the same document race with last-write-wins; see
//! DESIGN.md for why this is documented rather than fixed.

pub mod backend;
pub mod notifier;

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use tualmi_core::{Cart, CartItem, CartSummary, VariantKey};

pub use backend::{DocumentStore, DocumentStoreError, MemoryDocumentStore, PgDocumentStore};
pub use notifier::{ChangeNotifier, ListenerId};

/// Errors surfaced by cart mutations.
///
/// Read failures never surface: an unreadable or malformed document is
/// treated as an empty cart and logged.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The persistence write failed; the mutation did not take effect.
    #[error("failed to persist cart: {0}")]
    Write(#[source] DocumentStoreError),

    /// The cart could not be encoded for storage.
    #[error("failed to encode cart document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Owns the canonical cart document and every mutation of it.
///
/// The UI and checkout logic observe and request mutations through this
/// type; nothing else writes the stored document.
pub struct CartStore {
    backend: Arc<dyn DocumentStore>,
    key: String,
    notifier: ChangeNotifier,
}

impl CartStore {
    pub fn new(backend: Arc<dyn DocumentStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            notifier: ChangeNotifier::new(),
        }
    }

    /// All current cart lines. Never fails: a missing or corrupt document
    /// yields an empty sequence.
    pub async fn items(&self) -> Vec<CartItem> {
        self.load().await.into_items()
    }

    /// Add a line, merging quantities when the variant key already exists.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add(&self, item: CartItem) -> Result<CartSummary, CartStoreError> {
        let mut cart = self.load().await;
        cart.add(item);
        self.commit(&cart).await
    }

    /// Delete the matching line. A missing line is a no-op, not an error;
    /// the summary is still re-persisted and broadcast.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn remove(&self, key: &VariantKey) -> Result<CartSummary, CartStoreError> {
        let mut cart = self.load().await;
        cart.remove(key);
        self.commit(&cart).await
    }

    /// Set the absolute quantity of a line. A non-positive quantity behaves
    /// exactly as [`Self::remove`]; a missing line is a no-op.
    #[instrument(skip(self), fields(key = %key, quantity))]
    pub async fn update_quantity(
        &self,
        key: &VariantKey,
        quantity: i64,
    ) -> Result<CartSummary, CartStoreError> {
        if quantity <= 0 {
            return self.remove(key).await;
        }
        let mut cart = self.load().await;
        if cart.set_quantity(key, quantity) {
            self.commit(&cart).await
        } else {
            Ok(cart.summary())
        }
    }

    /// Delete the entire persisted document and broadcast a zero summary.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<CartSummary, CartStoreError> {
        self.backend
            .delete(&self.key)
            .await
            .map_err(CartStoreError::Write)?;
        let summary = CartSummary::empty();
        self.notifier.notify(&summary);
        Ok(summary)
    }

    /// Current summary, recomputed from the stored lines.
    pub async fn summary(&self) -> CartSummary {
        self.load().await.summary()
    }

    /// Current total item count.
    pub async fn count(&self) -> u64 {
        self.summary().await.count
    }

    /// Current total price.
    pub async fn total(&self) -> rust_decimal::Decimal {
        self.summary().await.total
    }

    /// Register a listener for post-mutation summaries.
    pub fn subscribe(
        &self,
        listener: impl Fn(&CartSummary) + Send + Sync + 'static,
    ) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    /// Remove a previously registered listener.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.notifier.unsubscribe(id);
    }

    async fn load(&self) -> Cart {
        match self.backend.get(&self.key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<CartItem>>(&bytes) {
                Ok(items) => Cart::from_items(items),
                Err(e) => {
                    tracing::warn!(error = %e, key = %self.key, "Stored cart document is malformed, treating as empty");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, key = %self.key, "Failed to read cart document, treating as empty");
                Cart::new()
            }
        }
    }

    async fn commit(&self, cart: &Cart) -> Result<CartSummary, CartStoreError> {
        let bytes = serde_json::to_vec(cart.items()).map_err(CartStoreError::Encode)?;
        self.backend
            .put(&self.key, &bytes)
            .await
            .map_err(CartStoreError::Write)?;

        let summary = cart.summary();
        self.notifier.notify(&summary);
        Ok(summary)
    }
}
