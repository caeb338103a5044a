//! Integration tests for the cart API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p tualmi-storefront)
//!
//! Run with: cargo test -p tualmi-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use tualmi_integration_tests::storefront_base_url;

fn add_body(id: &str, size: &str, color: &str, price: f64, quantity: u32) -> Value {
    json!({
        "id": id,
        "name": format!("{id} ({color})"),
        "price": price,
        "image": format!("/images/{id}.jpg"),
        "color": color,
        "size": size,
        "quantity": quantity,
    })
}

async fn clear_cart(client: &Client, base_url: &str) {
    let resp = client
        .post(format!("{base_url}/cart/clear"))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_health_endpoint() {
    let resp = reqwest::get(format!("{}/health", storefront_base_url()))
        .await
        .expect("Failed to reach health endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse health body");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_add_merges_same_variant() {
    let client = Client::new();
    let base_url = storefront_base_url();
    clear_cart(&client, &base_url).await;

    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/cart/add"))
            .json(&add_body("shirt", "M", "Red", 25.0, 1))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");

    assert_eq!(cart["items"].as_array().expect("items array").len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(cart["count"], 2);
    assert_eq!(cart["total"], 50.0);

    clear_cart(&client, &base_url).await;
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_distinct_colors_stay_separate_lines() {
    let client = Client::new();
    let base_url = storefront_base_url();
    clear_cart(&client, &base_url).await;

    for color in ["Red", "Blue"] {
        client
            .post(format!("{base_url}/cart/add"))
            .json(&add_body("shirt", "M", color, 25.0, 2))
            .send()
            .await
            .expect("Failed to add to cart");
    }

    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");

    assert_eq!(cart["items"].as_array().expect("items array").len(), 2);
    assert_eq!(cart["count"], 4);

    clear_cart(&client, &base_url).await;
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_update_to_zero_removes_line() {
    let client = Client::new();
    let base_url = storefront_base_url();
    clear_cart(&client, &base_url).await;

    client
        .post(format!("{base_url}/cart/add"))
        .json(&add_body("shirt", "M", "Red", 25.0, 3))
        .send()
        .await
        .expect("Failed to add to cart");

    let summary: Value = client
        .post(format!("{base_url}/cart/update"))
        .json(&json!({ "id": "shirt", "size": "M", "color": "Red", "quantity": 0 }))
        .send()
        .await
        .expect("Failed to update cart")
        .json()
        .await
        .expect("Failed to parse summary");

    assert_eq!(summary["count"], 0);

    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert!(cart["items"].as_array().expect("items array").is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_remove_missing_line_is_noop() {
    let client = Client::new();
    let base_url = storefront_base_url();
    clear_cart(&client, &base_url).await;

    client
        .post(format!("{base_url}/cart/add"))
        .json(&add_body("shirt", "M", "Red", 25.0, 1))
        .send()
        .await
        .expect("Failed to add to cart");

    let summary: Value = client
        .post(format!("{base_url}/cart/remove"))
        .json(&json!({ "id": "hat", "size": "M", "color": "Red" }))
        .send()
        .await
        .expect("Failed to remove from cart")
        .json()
        .await
        .expect("Failed to parse summary");

    assert_eq!(summary["count"], 1);

    clear_cart(&client, &base_url).await;
}
