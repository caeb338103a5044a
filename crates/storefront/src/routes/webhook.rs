//! Webhook route handler.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;
use crate::stripe::{SIGNATURE_HEADER, WebhookError};

/// Receive a signed gateway notification.
///
/// The signature is checked against the raw body before anything is parsed;
/// a mismatch is rejected with a client error and never dispatched.
#[instrument(skip_all)]
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            WebhookError::InvalidSignature(format!("missing {SIGNATURE_HEADER} header"))
        })?;

    let event = state.webhooks().process(&body, signature)?;
    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Webhook processed");

    Ok(Json(json!({ "received": true })))
}
