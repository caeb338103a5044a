//! Stripe hosted-checkout integration.
//!
//! # Architecture
//!
//! - The cart is converted into gateway line items locally
//!   ([`checkout::build_line_items`]); an empty cart is rejected before any
//!   network traffic.
//! - [`checkout::StripeClient`] creates hosted checkout sessions against
//!   the Checkout Sessions REST API. The shopper is redirected to the
//!   hosted payment page client-side using the returned session id.
//! - [`webhook`] verifies signed asynchronous payment notifications and
//!   dispatches recognized event types to a fulfillment hook.
//!
//! One gateway attempt per request; failures surface to the caller for a
//! manual retry.

pub mod checkout;
pub mod webhook;

pub use checkout::{CheckoutError, GatewayLineItem, SessionHandle, StripeClient, build_line_items};
pub use webhook::{
    FulfillmentHook, LogFulfillment, SIGNATURE_HEADER, WebhookError, WebhookEvent, WebhookHandler,
};
