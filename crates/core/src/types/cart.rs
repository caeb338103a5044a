//! Cart line items and the pure cart algebra.
//!
//! A [`Cart`] is an ordered sequence of [`CartItem`] lines with pairwise
//! distinct variant keys. Two additions with the same key merge into one
//! line; a line whose quantity drops to zero is deleted, never kept.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The (product, size, color) tuple that decides whether two additions
/// merge into one line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    pub product_id: String,
    pub size: String,
    pub color: String,
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.product_id, self.size, self.color)
    }
}

/// One line in the cart.
///
/// Serializes to the persisted document shape:
/// `{ id, name, price, image, color, size, quantity }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    /// Unit price in the major currency unit (dollars, not cents).
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    pub color: String,
    pub size: String,
    pub quantity: u32,
}

impl CartItem {
    /// The identity key of this line.
    #[must_use]
    pub fn variant_key(&self) -> VariantKey {
        VariantKey {
            product_id: self.id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    fn matches(&self, key: &VariantKey) -> bool {
        self.id == key.product_id && self.size == key.size && self.color == key.color
    }
}

/// Derived cart totals. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CartSummary {
    /// Compute the summary of a sequence of lines.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            count: items.iter().map(|i| u64::from(i.quantity)).sum(),
            total: items
                .iter()
                .map(|i| i.price * Decimal::from(i.quantity))
                .sum(),
        }
    }

    /// The summary of an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            count: 0,
            total: Decimal::ZERO,
        }
    }
}

/// An ordered sequence of cart lines with pairwise distinct variant keys.
///
/// Insertion order is preserved for display but carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored lines.
    ///
    /// Lines with a quantity below 1 or a negative price are dropped;
    /// duplicate variant keys are merged into one line.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity < 1 || item.price.is_sign_negative() {
                continue;
            }
            cart.add(item);
        }
        cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line, merging quantities when the variant key already exists.
    pub fn add(&mut self, item: CartItem) {
        let key = item.variant_key();
        if let Some(existing) = self.items.iter_mut().find(|i| i.matches(&key)) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Remove the line with the given key. Returns whether a line was removed.
    pub fn remove(&mut self, key: &VariantKey) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.matches(key));
        self.items.len() != before
    }

    /// Set the absolute quantity of a line. A non-positive quantity removes
    /// the line. Returns whether the cart changed.
    pub fn set_quantity(&mut self, key: &VariantKey, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(key);
        }
        match self.items.iter_mut().find(|i| i.matches(key)) {
            Some(item) => {
                item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                true
            }
            None => false,
        }
    }

    /// Total item count: Σ line quantities.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.summary().count
    }

    /// Total price: Σ unit price × quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.summary().total
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(&self.items)
    }
}
