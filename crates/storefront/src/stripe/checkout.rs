//! Checkout-session building and the Stripe Checkout Sessions client.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use tualmi_core::{CartItem, CurrencyCode, to_minor_units};

use crate::config::StripeConfig;

/// Errors from checkout-session creation.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout attempted with no items; rejected before any gateway call.
    #[error("Cart is empty")]
    EmptyCart,

    /// The gateway rejected or failed the request.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// The HTTP round trip itself failed.
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One line of a checkout-session request, in gateway terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayLineItem {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub currency: CurrencyCode,
    /// Unit amount in minor units (cents).
    pub unit_amount: i64,
    pub quantity: u32,
}

/// A gateway-issued handle for one pending payment attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionHandle {
    pub id: String,
    /// Hosted payment page URL, when the gateway returns one.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    #[serde(default)]
    message: String,
}

/// Convert cart lines into gateway line items.
///
/// Unit amounts are converted to minor units with midpoint rounding away
/// from zero; the line description is composed from size and color; image
/// references are resolved against `client_url`.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] when `items` is empty. This check
/// runs before any gateway contact.
pub fn build_line_items(
    items: &[CartItem],
    currency: CurrencyCode,
    client_url: &Url,
) -> Result<Vec<GatewayLineItem>, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    Ok(items
        .iter()
        .map(|item| GatewayLineItem {
            name: item.name.clone(),
            description: format!("Size: {}, Color: {}", item.size, item.color),
            image_url: resolve_image_url(&item.image, client_url),
            currency,
            unit_amount: to_minor_units(item.price),
            quantity: item.quantity,
        })
        .collect())
}

/// Resolve a stored image reference to an absolute URL.
///
/// Absolute `http(s)` references pass through unchanged; relative paths
/// are rooted at the public client URL. Empty references resolve to no
/// image at all.
fn resolve_image_url(image: &str, client_url: &Url) -> Option<String> {
    if image.is_empty() {
        return None;
    }
    if image.starts_with("http://") || image.starts_with("https://") {
        return Some(image.to_string());
    }
    let path = if image.starts_with('/') {
        image.to_string()
    } else {
        format!("/{image}")
    };
    client_url.join(&path).map(String::from).ok()
}

/// Client for the Stripe Checkout Sessions API.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    endpoint: String,
    secret_key: String,
    success_url: String,
    cancel_url: String,
    allowed_shipping_countries: Vec<String>,
}

impl StripeClient {
    /// Create a new checkout-sessions client.
    ///
    /// Success and cancel redirects point back into the shop front-end at
    /// `client_url`; the session id placeholder in the success URL is
    /// substituted by the gateway.
    #[must_use]
    pub fn new(config: &StripeConfig, client_url: &Url) -> Self {
        let base = client_url.as_str().trim_end_matches('/').to_string();
        let endpoint = format!(
            "{}/v1/checkout/sessions",
            config.api_base.trim_end_matches('/')
        );

        Self {
            inner: Arc::new(StripeClientInner {
                client: reqwest::Client::new(),
                endpoint,
                secret_key: config.secret_key.expose_secret().to_string(),
                success_url: format!("{base}/success.html?session_id={{CHECKOUT_SESSION_ID}}"),
                cancel_url: format!("{base}/cart.html"),
                allowed_shipping_countries: config.allowed_shipping_countries.clone(),
            }),
        }
    }

    /// Create a hosted checkout session for the given line items.
    ///
    /// Requests card payment with a required billing address and the
    /// configured allowed shipping countries. One attempt per call; a
    /// failure is surfaced for the caller to retry manually.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty line-item list,
    /// [`CheckoutError::Gateway`] when the gateway reports an error, and
    /// [`CheckoutError::Http`] when the request itself fails.
    #[instrument(skip(self, line_items), fields(lines = line_items.len()))]
    pub async fn create_session(
        &self,
        line_items: &[GatewayLineItem],
    ) -> Result<SessionHandle, CheckoutError> {
        if line_items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let params = self.session_params(line_items);
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .bearer_auth(&self.inner.secret_key)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GatewayErrorBody>(&body)
                .map_or_else(|_| format!("HTTP {status}"), |e| e.error.message);
            tracing::error!(
                status = %status,
                message = %message,
                "Checkout session request failed"
            );
            return Err(CheckoutError::Gateway(message));
        }

        serde_json::from_str::<SessionHandle>(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse checkout session response"
            );
            CheckoutError::Gateway(format!("unparseable gateway response: {e}"))
        })
    }

    /// Form parameters for one session-create request.
    fn session_params(&self, line_items: &[GatewayLineItem]) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            (
                "billing_address_collection".to_string(),
                "required".to_string(),
            ),
            ("success_url".to_string(), self.inner.success_url.clone()),
            ("cancel_url".to_string(), self.inner.cancel_url.clone()),
        ];

        for (i, country) in self.inner.allowed_shipping_countries.iter().enumerate() {
            params.push((
                format!("shipping_address_collection[allowed_countries][{i}]"),
                country.clone(),
            ));
        }

        for (i, line) in line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            params.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
            params.push((
                format!("{prefix}[price_data][currency]"),
                line.currency.gateway_code().to_string(),
            ));
            params.push((
                format!("{prefix}[price_data][unit_amount]"),
                line.unit_amount.to_string(),
            ));
            params.push((
                format!("{prefix}[price_data][product_data][name]"),
                line.name.clone(),
            ));
            params.push((
                format!("{prefix}[price_data][product_data][description]"),
                line.description.clone(),
            ));
            if let Some(url) = &line.image_url {
                params.push((
                    format!("{prefix}[price_data][product_data][images][0]"),
                    url.clone(),
                ));
            }
        }

        params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client_url() -> Url {
        Url::parse("https://shop.tualmi.test").unwrap()
    }

    fn item(price: &str, quantity: u32, image: &str) -> CartItem {
        CartItem {
            id: "shirt".to_string(),
            name: "Linen Shirt".to_string(),
            price: price.parse().unwrap(),
            image: image.to_string(),
            color: "Red".to_string(),
            size: "M".to_string(),
            quantity,
        }
    }

    fn test_client() -> StripeClient {
        let config = StripeConfig {
            secret_key: SecretString::from("sk_test_123"),
            webhook_secret: SecretString::from("whsec_123"),
            api_base: "https://api.stripe.com".to_string(),
            currency: CurrencyCode::USD,
            allowed_shipping_countries: vec![
                "US".to_string(),
                "CA".to_string(),
                "GB".to_string(),
                "AU".to_string(),
            ],
        };
        StripeClient::new(&config, &client_url())
    }

    #[test]
    fn test_empty_cart_rejected_before_gateway() {
        let result = build_line_items(&[], CurrencyCode::USD, &client_url());
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_line_item_conversion() {
        let lines =
            build_line_items(&[item("19.99", 2, "/images/shirt.jpg")], CurrencyCode::USD, &client_url())
                .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].unit_amount, 1999);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].description, "Size: M, Color: Red");
        assert_eq!(
            lines[0].image_url.as_deref(),
            Some("https://shop.tualmi.test/images/shirt.jpg")
        );
    }

    #[test]
    fn test_midpoint_price_rounds_up() {
        let lines =
            build_line_items(&[item("9.995", 3, "")], CurrencyCode::USD, &client_url()).unwrap();

        assert_eq!(lines[0].unit_amount, 1000);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].image_url, None);
    }

    #[test]
    fn test_absolute_image_url_passes_through() {
        let url = resolve_image_url("https://cdn.example.com/a.png", &client_url());
        assert_eq!(url.as_deref(), Some("https://cdn.example.com/a.png"));
    }

    #[test]
    fn test_relative_image_url_is_rooted_at_client_url() {
        let with_slash = resolve_image_url("/images/a.png", &client_url());
        let without_slash = resolve_image_url("images/a.png", &client_url());

        assert_eq!(
            with_slash.as_deref(),
            Some("https://shop.tualmi.test/images/a.png")
        );
        assert_eq!(with_slash, without_slash);
    }

    #[test]
    fn test_session_params_shape() {
        let client = test_client();
        let lines = build_line_items(
            &[item("25", 1, "/images/shirt.jpg")],
            CurrencyCode::USD,
            &client_url(),
        )
        .unwrap();

        let params = client.session_params(&lines);
        let find = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(find("mode"), Some("payment"));
        assert_eq!(find("payment_method_types[0]"), Some("card"));
        assert_eq!(find("billing_address_collection"), Some("required"));
        assert_eq!(
            find("success_url"),
            Some("https://shop.tualmi.test/success.html?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(
            find("cancel_url"),
            Some("https://shop.tualmi.test/cart.html")
        );
        assert_eq!(
            find("shipping_address_collection[allowed_countries][0]"),
            Some("US")
        );
        assert_eq!(
            find("shipping_address_collection[allowed_countries][3]"),
            Some("AU")
        );
        assert_eq!(find("line_items[0][quantity]"), Some("1"));
        assert_eq!(find("line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(find("line_items[0][price_data][unit_amount]"), Some("2500"));
        assert_eq!(
            find("line_items[0][price_data][product_data][name]"),
            Some("Linen Shirt")
        );
        assert_eq!(
            find("line_items[0][price_data][product_data][images][0]"),
            Some("https://shop.tualmi.test/images/shirt.jpg")
        );
    }

    #[test]
    fn test_session_params_omit_missing_image() {
        let client = test_client();
        let lines = build_line_items(&[item("25", 1, "")], CurrencyCode::USD, &client_url()).unwrap();

        let params = client.session_params(&lines);
        assert!(
            params
                .iter()
                .all(|(k, _)| !k.contains("[images]"))
        );
    }

    #[tokio::test]
    async fn test_create_session_rejects_empty_line_items() {
        let client = test_client();
        let result = client.create_session(&[]).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }
}
