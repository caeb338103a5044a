//! Shared helpers for storefront integration tests.
//!
//! These tests exercise a running storefront over HTTP:
//! - Start `PostgreSQL` and run `tualmi-cli migrate`
//! - Start the server: `cargo run -p tualmi-storefront`
//! - Run with: `cargo test -p tualmi-integration-tests -- --ignored`

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Webhook signing secret the server under test was started with.
#[must_use]
pub fn webhook_secret() -> String {
    std::env::var("STRIPE_WEBHOOK_SECRET")
        .unwrap_or_else(|_| "whsec_integration_tests".to_string())
}

/// Compute a gateway-style signature header for `payload`.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts keys of any size
pub fn stripe_signature(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    )
}
