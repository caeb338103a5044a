//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Health check
//! GET  /health/ready                 - Readiness (database connectivity)
//!
//! # Cart (JSON)
//! GET  /cart                         - Current cart lines and totals
//! POST /cart/add                     - Add a line (merges by variant key)
//! POST /cart/update                  - Set the absolute quantity of a line
//! POST /cart/remove                  - Remove a line
//! POST /cart/clear                   - Delete the cart document
//! GET  /cart/count                   - Current summary (count, total)
//! POST /cart/checkout                - Create a session from the stored cart
//!
//! # Gateway
//! POST /api/create-checkout-session  - Create a session from request items
//! POST /api/webhook                  - Signed payment notifications
//! ```

pub mod cart;
pub mod checkout;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/checkout", post(cart::checkout))
}

/// Create the gateway-facing API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/create-checkout-session",
            post(checkout::create_checkout_session),
        )
        .route("/webhook", post(webhook::receive))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .nest("/api", api_routes())
}
