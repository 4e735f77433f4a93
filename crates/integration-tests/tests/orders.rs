//! Integration tests for the order pipeline: placement, stock decrement,
//! all-or-nothing failure, visibility, and status transitions.
//!
//! Run with: `cargo test -p heartwood-integration-tests -- --ignored`

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use heartwood_core::OrderStatus;
use heartwood_integration_tests::{base_url, client, create_product, fetch_product, place_order, signup};
use heartwood_server::models::Order;

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_order_placement_decrements_stock_and_totals() {
    let seller = client();
    signup(&seller, "seller").await;
    let product = create_product(&seller, "Ash side table", "100", 5).await;
    let product_id = product["id"].as_i64().expect("product id");

    let buyer = client();
    let buyer_account = signup(&buyer, "buyer").await;

    let resp = place_order(&buyer, &[(product_id, 2)]).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let order: Order = resp.json().await.expect("order response not JSON");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount.amount(), Decimal::from(200));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);
    assert!(order.order_number.as_str().starts_with("ORD-"));
    // The buyer reference comes back populated
    assert_eq!(
        order.buyer_id.summary().expect("populated buyer").email.as_str(),
        buyer_account.email
    );

    let product = fetch_product(&buyer, product_id).await;
    assert_eq!(product["stock"], 3);
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_insufficient_stock_leaves_everything_unchanged() {
    let seller = client();
    signup(&seller, "seller").await;
    let plenty = create_product(&seller, "Oak shelf", "50", 10).await;
    let scarce = create_product(&seller, "Last walnut chair", "150", 1).await;
    let plenty_id = plenty["id"].as_i64().expect("product id");
    let scarce_id = scarce["id"].as_i64().expect("product id");

    let buyer = client();
    signup(&buyer, "buyer").await;

    // Second line exceeds stock: the whole order must fail with no
    // partial decrement on the first line
    let resp = place_order(&buyer, &[(plenty_id, 2), (scarce_id, 3)]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(fetch_product(&buyer, plenty_id).await["stock"], 10);
    assert_eq!(fetch_product(&buyer, scarce_id).await["stock"], 1);

    // And no order was created
    let resp = buyer
        .get(format!("{}/orders", base_url()))
        .send()
        .await
        .expect("list orders failed");
    let orders: Vec<Value> = resp.json().await.expect("orders response not JSON");
    assert!(orders.is_empty());
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_concurrent_orders_never_oversell() {
    let seller = client();
    signup(&seller, "seller").await;
    let product = create_product(&seller, "Contested bench", "75", 3).await;
    let product_id = product["id"].as_i64().expect("product id");

    let first = client();
    signup(&first, "buyer").await;
    let second = client();
    signup(&second, "buyer").await;

    // Combined quantity (4) exceeds stock (3): exactly one may succeed
    let first_items = [(product_id, 2)];
    let second_items = [(product_id, 2)];
    let (a, b) = tokio::join!(
        place_order(&first, &first_items),
        place_order(&second, &second_items),
    );

    let statuses = [a.status(), b.status()];
    let successes = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    assert_eq!(successes, 1, "statuses were {statuses:?}");

    let product = fetch_product(&first, product_id).await;
    assert_eq!(product["stock"], 1);
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_sample_and_unknown_products_rejected() {
    let buyer = client();
    signup(&buyer, "buyer").await;

    // Demo placeholders are rejected outright
    let resp = buyer
        .post(format!("{}/orders", base_url()))
        .json(&json!({ "items": [{ "productId": "sample-1", "quantity": 1 }] }))
        .send()
        .await
        .expect("place order failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown catalog IDs are a 404
    let resp = place_order(&buyer, &[(999_999_999, 1)]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Empty carts are a 400
    let resp = buyer
        .post(format!("{}/orders", base_url()))
        .json(&json!({ "items": [] }))
        .send()
        .await
        .expect("place order failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // And so is a missing items field
    let resp = buyer
        .post(format!("{}/orders", base_url()))
        .json(&json!({}))
        .send()
        .await
        .expect("place order failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_unauthenticated_orders_rejected() {
    let anonymous = client();

    let resp = anonymous
        .get(format!("{}/orders", base_url()))
        .send()
        .await
        .expect("list orders failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = place_order(&anonymous, &[(1, 1)]).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_buyers_see_only_their_own_orders() {
    let seller = client();
    signup(&seller, "seller").await;
    let product = create_product(&seller, "Visibility stool", "40", 20).await;
    let product_id = product["id"].as_i64().expect("product id");

    let buyer_a = client();
    let account_a = signup(&buyer_a, "buyer").await;
    let buyer_b = client();
    signup(&buyer_b, "buyer").await;

    assert_eq!(place_order(&buyer_a, &[(product_id, 1)]).await.status(), 201);
    assert_eq!(place_order(&buyer_b, &[(product_id, 1)]).await.status(), 201);

    // Buyer A sees only their own orders
    let orders: Vec<Order> = buyer_a
        .get(format!("{}/orders", base_url()))
        .send()
        .await
        .expect("list orders failed")
        .json()
        .await
        .expect("orders response not JSON");
    assert!(!orders.is_empty());
    assert!(
        orders
            .iter()
            .all(|o| o.buyer_id.id().as_i32() == i32::try_from(account_a.id).expect("id fits")),
        "buyer saw someone else's order"
    );

    // The seller sees both buyers' orders, buyer info included
    let orders: Vec<Order> = seller
        .get(format!("{}/orders", base_url()))
        .send()
        .await
        .expect("list orders failed")
        .json()
        .await
        .expect("orders response not JSON");
    let distinct_buyers: std::collections::HashSet<i32> =
        orders.iter().map(|o| o.buyer_id.id().as_i32()).collect();
    assert!(distinct_buyers.len() >= 2);
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_status_transitions_are_role_gated() {
    let seller = client();
    signup(&seller, "seller").await;
    let product = create_product(&seller, "Status ottoman", "60", 10).await;
    let product_id = product["id"].as_i64().expect("product id");

    let buyer = client();
    signup(&buyer, "buyer").await;
    let resp = place_order(&buyer, &[(product_id, 1)]).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Order = resp.json().await.expect("order response not JSON");
    let order_id = order.id.as_i32();

    // Buyers cannot transition status
    let resp = buyer
        .patch(format!("{}/orders/{order_id}", base_url()))
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Values outside the three states are rejected with no state change
    let resp = seller
        .patch(format!("{}/orders/{order_id}", base_url()))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Sellers can walk the order through any of the three states
    for status in ["completed", "cancelled", "pending"] {
        let resp = seller
            .patch(format!("{}/orders/{order_id}", base_url()))
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("patch failed");
        assert_eq!(resp.status(), StatusCode::OK);
        let order: Order = resp.json().await.expect("order response not JSON");
        assert_eq!(order.status.to_string(), status);
    }

    // Cancellation does not restock
    let resp = seller
        .patch(format!("{}/orders/{order_id}", base_url()))
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(fetch_product(&buyer, product_id).await["stock"], 9);

    // Unknown order IDs are a 404
    let resp = seller
        .patch(format!("{}/orders/0", base_url()))
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
