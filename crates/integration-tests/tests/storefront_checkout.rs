//! Integration tests for checkout-session creation.
//!
//! The empty-cart rejection runs entirely locally, so it needs only the
//! server. Creating a real session additionally needs valid Stripe test
//! credentials in the server environment.
//!
//! Run with: cargo test -p tualmi-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use tualmi_integration_tests::storefront_base_url;

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_empty_cart_is_rejected_before_gateway() {
    let client = Client::new();

    let resp = client
        .post(format!(
            "{}/api/create-checkout-session",
            storefront_base_url()
        ))
        .json(&json!({ "items": [] }))
        .send()
        .await
        .expect("Failed to post checkout request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "Cart is empty");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_stored_empty_cart_checkout_is_rejected() {
    let client = Client::new();
    let base_url = storefront_base_url();

    client
        .post(format!("{base_url}/cart/clear"))
        .send()
        .await
        .expect("Failed to clear cart");

    let resp = client
        .post(format!("{base_url}/cart/checkout"))
        .send()
        .await
        .expect("Failed to post checkout request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and Stripe test credentials"]
async fn test_create_session_returns_session_id() {
    let client = Client::new();

    let resp = client
        .post(format!(
            "{}/api/create-checkout-session",
            storefront_base_url()
        ))
        .json(&json!({
            "items": [{
                "id": "shirt",
                "name": "Linen Shirt",
                "price": 19.99,
                "image": "/images/shirt.jpg",
                "color": "Red",
                "size": "M",
                "quantity": 2,
            }]
        }))
        .send()
        .await
        .expect("Failed to post checkout request");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse session body");
    assert!(
        body["id"]
            .as_str()
            .expect("session id string")
            .starts_with("cs_")
    );
}
