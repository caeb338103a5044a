//! Core types for the Tualmi storefront.

pub mod cart;
pub mod price;

pub use cart::{Cart, CartItem, CartSummary, VariantKey};
pub use price::{CurrencyCode, ParseCurrencyError, to_minor_units};
