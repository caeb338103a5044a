//! Checkout-session route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tualmi_core::CartItem;

use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;
use crate::stripe::{CheckoutError, SessionHandle, build_line_items};

/// Create-session request body: the cart lines to charge for.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// Create-session response: the gateway session handle the client redirects
/// with.
#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub id: String,
}

/// Build line items and create one checkout session.
///
/// The empty-cart check happens locally, before the gateway is contacted.
pub(crate) async fn create_session_for_items(
    state: &AppState,
    items: &[CartItem],
) -> std::result::Result<SessionHandle, CheckoutError> {
    let line_items = build_line_items(
        items,
        state.config().stripe.currency,
        &state.config().client_url,
    )?;

    add_breadcrumb("checkout", "Creating checkout session");
    state.gateway().create_session(&line_items).await
}

/// Create a hosted checkout session from client-supplied items.
#[instrument(skip(state, body), fields(lines = body.items.len()))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>> {
    let session = create_session_for_items(&state, &body.items).await?;

    tracing::info!(session_id = %session.id, "Checkout session created");
    Ok(Json(CheckoutSessionResponse { id: session.id }))
}
