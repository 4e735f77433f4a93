//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use heartwood_core::OrderId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::OrderService;
use crate::services::orders::OrderItemRequest;
use crate::state::AppState;

/// List orders visible to the caller.
///
/// GET /orders
///
/// Buyers see only their own orders; sellers and admins see all orders,
/// buyer info included.
///
/// # Errors
///
/// 401 when not logged in.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool()).list_for(&user).await?;
    Ok(Json(orders))
}

/// Request to place an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Option<Vec<OrderItemRequest>>,
}

/// Place an order.
///
/// POST /orders
///
/// # Errors
///
/// 400 for an empty cart, placeholder products, bad quantities, or
/// insufficient stock; 404 for unknown products. Failures leave every
/// product's stock untouched.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let items = req.items.unwrap_or_default();

    let order = OrderService::new(state.pool())
        .place_order(&user, &items)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Request to update an order's status.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<String>,
}

/// Update an order's status.
///
/// PATCH /orders/{id}
///
/// # Errors
///
/// 401 when not logged in, 403 for buyers, 400 for a status outside
/// pending/completed/cancelled, 404 for unknown orders.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>> {
    let status = req.status.as_deref().unwrap_or_default();

    let order = OrderService::new(state.pool())
        .update_status(&user, id, status)
        .await?;

    Ok(Json(order))
}
