//! Cart route handlers.
//!
//! Mutations respond with the post-mutation summary. A persistence failure
//! is logged but not surfaced to the shopper; the response then reflects
//! the state that actually persisted.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tualmi_core::{CartItem, CartSummary, VariantKey};

use crate::error::{AppError, Result};
use crate::routes::checkout::{CheckoutSessionResponse, create_session_for_items};
use crate::state::AppState;

/// Full cart payload returned to the UI.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    pub color: String,
    pub size: String,
    pub quantity: Option<u32>,
}

/// Update-quantity request body. The quantity is absolute, not relative.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub id: String,
    pub size: String,
    pub color: String,
    pub quantity: i64,
}

/// Remove-line request body.
#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub id: String,
    pub size: String,
    pub color: String,
}

fn variant_key(id: String, size: String, color: String) -> VariantKey {
    VariantKey {
        product_id: id,
        size,
        color,
    }
}

/// Current cart lines and totals.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartResponse> {
    let items = state.cart().items().await;
    let summary = CartSummary::of(&items);

    Json(CartResponse {
        items,
        count: summary.count,
        total: summary.total,
    })
}

/// Add a line to the cart, merging by variant key.
#[instrument(skip(state, body), fields(product_id = %body.id))]
pub async fn add(
    State(state): State<AppState>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartSummary>> {
    if body.price.is_sign_negative() {
        return Err(AppError::BadRequest(
            "price must be non-negative".to_string(),
        ));
    }

    let item = CartItem {
        id: body.id,
        name: body.name,
        price: body.price,
        image: body.image,
        color: body.color,
        size: body.size,
        quantity: body.quantity.unwrap_or(1).max(1),
    };

    let summary = match state.cart().add(item).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist cart mutation");
            state.cart().summary().await
        }
    };

    Ok(Json(summary))
}

/// Set the absolute quantity of a line; zero or less removes it.
#[instrument(skip(state, body), fields(product_id = %body.id, quantity = body.quantity))]
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Json<CartSummary> {
    let key = variant_key(body.id, body.size, body.color);

    let summary = match state.cart().update_quantity(&key, body.quantity).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist cart mutation");
            state.cart().summary().await
        }
    };

    Json(summary)
}

/// Remove a line from the cart.
#[instrument(skip(state, body), fields(product_id = %body.id))]
pub async fn remove(
    State(state): State<AppState>,
    Json(body): Json<RemoveItemRequest>,
) -> Json<CartSummary> {
    let key = variant_key(body.id, body.size, body.color);

    let summary = match state.cart().remove(&key).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist cart mutation");
            state.cart().summary().await
        }
    };

    Json(summary)
}

/// Delete the entire cart document.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Json<CartSummary> {
    let summary = match state.cart().clear().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Failed to clear cart");
            state.cart().summary().await
        }
    };

    Json(summary)
}

/// Current cart summary (count badge).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Json<CartSummary> {
    Json(state.cart().summary().await)
}

/// Create a checkout session from the stored cart.
#[instrument(skip(state))]
pub async fn checkout(State(state): State<AppState>) -> Result<Json<CheckoutSessionResponse>> {
    let items = state.cart().items().await;
    let session = create_session_for_items(&state, &items).await?;

    Ok(Json(CheckoutSessionResponse { id: session.id }))
}
