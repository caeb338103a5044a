//! Webhook signature verification and event dispatch.
//!
//! Inbound payment notifications carry an HMAC-SHA256 signature over
//! `"{timestamp}.{body}"` in the `stripe-signature` header. The signature
//! must verify against the shared signing secret before the payload is
//! parsed or acted upon; a mismatch means the request never reaches
//! fulfillment.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::instrument;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum accepted age of a signed payload (replay protection).
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Errors from webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature missing, malformed, expired, or not matching the payload.
    #[error("Webhook signature invalid: {0}")]
    InvalidSignature(String),

    /// The verified payload could not be parsed as an event.
    #[error("Webhook payload invalid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A verified gateway event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

/// Event payload wrapper: the object the event describes.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Verify `signature_header` against `payload` for `secret`.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidSignature`] when the header is missing a
/// timestamp or `v1` entry, the timestamp is outside the tolerance window,
/// or no `v1` candidate matches the computed signature.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
) -> Result<(), WebhookError> {
    verify_signature_at(
        payload,
        signature_header,
        secret,
        chrono::Utc::now().timestamp(),
    )
}

fn verify_signature_at(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now: i64,
) -> Result<(), WebhookError> {
    let (timestamp, candidates) = parse_signature_header(signature_header)?;

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookError::InvalidSignature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature("invalid signing secret".to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    for candidate in &candidates {
        let Ok(bytes) = hex::decode(candidate) else {
            continue;
        };
        // verify_slice compares in constant time
        if mac.clone().verify_slice(&bytes).is_ok() {
            return Ok(());
        }
    }

    Err(WebhookError::InvalidSignature(
        "no matching v1 signature".to_string(),
    ))
}

/// Split a `t=...,v1=...` header into its timestamp and signature candidates.
fn parse_signature_header(header: &str) -> Result<(i64, Vec<&str>), WebhookError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        let part = part.trim();
        if let Some(ts) = part.strip_prefix("t=") {
            timestamp = ts.parse::<i64>().ok();
        } else if let Some(signature) = part.strip_prefix("v1=") {
            candidates.push(signature);
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| WebhookError::InvalidSignature("missing timestamp".to_string()))?;
    if candidates.is_empty() {
        return Err(WebhookError::InvalidSignature(
            "missing v1 signature".to_string(),
        ));
    }
    Ok((timestamp, candidates))
}

/// Verify the signature, then parse the event body.
///
/// # Errors
///
/// Signature failures reject the payload before it is parsed; a verified
/// but malformed payload fails with [`WebhookError::Parse`].
pub fn construct_event(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
) -> Result<WebhookEvent, WebhookError> {
    verify_signature(payload, signature_header, secret)?;
    Ok(serde_json::from_slice(payload)?)
}

/// Downstream fulfillment actions for recognized gateway events.
pub trait FulfillmentHook: Send + Sync {
    fn checkout_completed(&self, session: &serde_json::Value);
    fn payment_succeeded(&self, payment_intent: &serde_json::Value);
    fn payment_failed(&self, payment_intent: &serde_json::Value);
}

/// Default hook: records outcomes in the log. The actual fulfillment
/// pipeline (order confirmation, email) is an external collaborator.
pub struct LogFulfillment;

impl FulfillmentHook for LogFulfillment {
    fn checkout_completed(&self, session: &serde_json::Value) {
        tracing::info!(
            session_id = %object_id(session),
            "Payment successful"
        );
    }

    fn payment_succeeded(&self, payment_intent: &serde_json::Value) {
        tracing::info!(
            payment_intent_id = %object_id(payment_intent),
            "PaymentIntent was successful"
        );
    }

    fn payment_failed(&self, payment_intent: &serde_json::Value) {
        tracing::warn!(
            payment_intent_id = %object_id(payment_intent),
            "Payment failed"
        );
    }
}

fn object_id(object: &serde_json::Value) -> &str {
    object
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown")
}

/// Verifies and dispatches inbound gateway notifications.
pub struct WebhookHandler {
    secret: SecretString,
    hook: Arc<dyn FulfillmentHook>,
}

impl WebhookHandler {
    pub fn new(secret: SecretString, hook: Arc<dyn FulfillmentHook>) -> Self {
        Self { secret, hook }
    }

    /// Verify, parse, and dispatch one notification.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError`] on signature or parse failure; the hook is
    /// never invoked in either case.
    #[instrument(skip_all)]
    pub fn process(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, WebhookError> {
        let event = construct_event(payload, signature_header, self.secret.expose_secret())?;
        self.dispatch(&event);
        Ok(event)
    }

    /// Route a verified event by type. Unrecognized types are logged and
    /// ignored, not an error.
    pub fn dispatch(&self, event: &WebhookEvent) {
        match event.event_type.as_str() {
            "checkout.session.completed" => self.hook.checkout_completed(&event.data.object),
            "payment_intent.succeeded" => self.hook.payment_succeeded(&event.data.object),
            "payment_intent.payment_failed" => self.hook.payment_failed(&event.data.object),
            other => {
                tracing::debug!(event_type = %other, "Unhandled webhook event type");
            }
        }
    }
}
