//! Tualmi Core - Shared domain types.
//!
//! This crate provides the common types used across the Tualmi components:
//! - `storefront` - Cart, checkout, and webhook backend
//! - `cli` - Command-line tools for migrations and cart management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. The cart algebra (line merging, quantity rules,
//! derived summaries) lives here so its laws can be tested without any
//! storage backend.
//!
//! # Modules
//!
//! - [`types`] - Cart line items, variant identity keys, derived summaries,
//!   and money helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
