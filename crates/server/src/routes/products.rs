//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use heartwood_core::{CategoryId, Price, ProductId};

use crate::db::products::{NewProduct, ProductChanges};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::services::ProductService;
use crate::state::AppState;

/// List the catalog, newest first.
///
/// GET /products
///
/// Public; each listing embeds its seller summary.
///
/// # Errors
///
/// 500 only, when the database is unreachable.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductService::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Get a single listing.
///
/// GET /products/{id}
///
/// # Errors
///
/// 404 for unknown IDs.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductService::new(state.pool()).get(id).await?;
    Ok(Json(product))
}

/// Request to create a listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i64>,
}

/// Create a listing.
///
/// POST /products
///
/// # Errors
///
/// 401 when not logged in, 403 for buyers, 400 for missing or invalid
/// fields.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let (Some(name), Some(description), Some(price), Some(category), Some(images), Some(stock)) = (
        req.name,
        req.description,
        req.price,
        req.category,
        req.images,
        req.stock,
    ) else {
        return Err(AppError::BadRequest("Missing required fields".to_owned()));
    };

    let new = NewProduct {
        name,
        description,
        price: parse_price(price)?,
        category,
        images,
        stock: parse_stock(stock)?,
        // Overwritten by the service with the caller's ID
        seller_id: user.id,
    };

    let product = ProductService::new(state.pool()).create(&user, new).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Request to update a listing. Absent fields keep their current value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub category_id: Option<CategoryId>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i64>,
}

/// Update a listing.
///
/// PUT /products/{id}
///
/// # Errors
///
/// 401 when not logged in, 403 unless the caller owns the listing or is an
/// admin, 404 for unknown IDs, 400 for invalid field values.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let changes = ProductChanges {
        name: req.name,
        description: req.description,
        price: req.price.map(parse_price).transpose()?,
        category: req.category,
        category_id: req.category_id,
        images: req.images,
        stock: req.stock.map(parse_stock).transpose()?,
    };

    let product = ProductService::new(state.pool())
        .update(&user, id, &changes)
        .await?;

    Ok(Json(product))
}

/// Delete a listing.
///
/// DELETE /products/{id}
///
/// # Errors
///
/// 401 when not logged in, 403 unless the caller owns the listing or is an
/// admin, 404 for unknown IDs.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    ProductService::new(state.pool()).delete(&user, id).await?;

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

/// A price from the wire: must be non-negative.
fn parse_price(price: Decimal) -> Result<Price> {
    Price::new(price).map_err(|_| AppError::BadRequest("Price cannot be negative".to_owned()))
}

/// A stock count from the wire: must fit a non-negative i32.
fn parse_stock(stock: i64) -> Result<i32> {
    i32::try_from(stock)
        .ok()
        .filter(|s| *s >= 0)
        .ok_or_else(|| AppError::BadRequest("Stock cannot be negative".to_owned()))
}
