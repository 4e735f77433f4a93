//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Auth
//! POST /auth/register          - Create an account
//! POST /auth/login             - Password login (sets session cookie)
//! POST /auth/logout            - Clear the session
//! GET  /auth/me                - Current session identity
//!
//! # Products
//! GET    /products             - Catalog listing (public)
//! GET    /products/{id}        - Single listing (public)
//! POST   /products             - Create listing (seller/admin)
//! PUT    /products/{id}        - Update listing (owner or admin)
//! DELETE /products/{id}        - Delete listing (owner or admin)
//!
//! # Orders
//! GET   /orders                - Buyer: own orders; staff: all orders
//! POST  /orders                - Place an order
//! PATCH /orders/{id}           - Update order status (seller/admin)
//! ```

pub mod auth;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::middleware;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Registration and login sit behind the per-IP rate limiter.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route_layer(middleware::auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", patch(orders::update_status))
}

/// Create all routes for the marketplace API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
}
