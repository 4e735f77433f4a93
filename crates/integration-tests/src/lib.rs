//! Integration tests for Heartwood.
//!
//! These tests drive a running server over HTTP and require:
//! - A running `PostgreSQL` database with migrations applied
//!   (`hw-cli migrate`)
//! - The server running (`cargo run -p heartwood-server`)
//!
//! Run with: `cargo test -p heartwood-integration-tests -- --ignored`
//!
//! Every test registers its own throwaway accounts (unique emails via
//! UUID), so tests don't interfere with each other or need cleanup.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Password used by every test account.
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("HEARTWOOD_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Create an HTTP client with a cookie store for session auth.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A registered test account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Register a fresh account with the given role and log it in on `client`.
///
/// # Panics
///
/// Panics if registration or login fails.
pub async fn signup(client: &Client, role: &str) -> Account {
    let base = base_url();
    let name = format!("test-{role}-{}", &Uuid::new_v4().to_string()[..8]);
    let email = format!("{name}@test.heartwood.shop");

    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({
            "name": name,
            "email": email,
            "password": TEST_PASSWORD,
            "role": role,
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), 201, "registration should succeed");

    let body: Value = resp.json().await.expect("register response not JSON");
    let id = body["user"]["id"].as_i64().expect("user id in response");

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), 200, "login should succeed");

    Account { id, name, email }
}

/// Create a listing as the logged-in seller on `client`.
///
/// Returns the created product JSON.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_product(client: &Client, name: &str, price: &str, stock: i64) -> Value {
    let resp = client
        .post(format!("{}/products", base_url()))
        .json(&json!({
            "name": name,
            "description": format!("{name} - integration test listing"),
            "price": price,
            "category": "modern-minimalism",
            "images": ["https://img.test.heartwood.shop/placeholder.jpg"],
            "stock": stock,
        }))
        .send()
        .await
        .expect("create product request failed");
    assert_eq!(resp.status(), 201, "product creation should succeed");

    resp.json().await.expect("product response not JSON")
}

/// Place an order for `(product_id, quantity)` pairs on `client`.
///
/// Returns the raw response for status assertions.
///
/// # Panics
///
/// Panics if the request cannot be sent.
pub async fn place_order(client: &Client, items: &[(i64, i64)]) -> reqwest::Response {
    let items: Vec<Value> = items
        .iter()
        .map(|(product_id, quantity)| json!({ "productId": product_id, "quantity": quantity }))
        .collect();

    client
        .post(format!("{}/orders", base_url()))
        .json(&json!({ "items": items }))
        .send()
        .await
        .expect("place order request failed")
}

/// Fetch a product by ID.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn fetch_product(client: &Client, id: i64) -> Value {
    let resp = client
        .get(format!("{}/products/{id}", base_url()))
        .send()
        .await
        .expect("fetch product request failed");
    assert_eq!(resp.status(), 200, "product fetch should succeed");

    resp.json().await.expect("product response not JSON")
}
