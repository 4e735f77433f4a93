//! Order placement and status transitions.
//!
//! Placement runs the whole check-and-decrement sequence inside a single
//! transaction: every product row is locked `FOR UPDATE` before its stock
//! check, decrements happen under those locks, and the order header and
//! item snapshots commit together. Any failure - a missing product, a
//! short stock count, an exhausted order-number retry - rolls the entire
//! transaction back, so a rejected order never leaves a partial decrement
//! behind.

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use thiserror::Error;

use heartwood_core::{OrderId, OrderNumber, OrderStatus, Price, PriceError, ProductId, UserRef};

use crate::db::RepositoryError;
use crate::db::orders::{
    OrderRepository, decrement_stock, insert_items, insert_order, product_for_update,
};
use crate::middleware::{RoleDenied, STAFF_ROLES, ensure_role};
use crate::models::order::{ItemProductRef, Order, OrderItem};
use crate::models::session::CurrentUser;

/// How many fresh order numbers to try when an insert hits the unique
/// index. The suffix space is 36^9, so a second collision in a row means
/// something is broken, not unlucky.
const ORDER_NUMBER_ATTEMPTS: u32 = 3;

/// Length of the random order-number suffix.
const ORDER_NUMBER_SUFFIX_LENGTH: usize = 9;

/// A requested line item, as submitted by the client.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    /// Product reference: a catalog ID or a demo placeholder string.
    pub product_id: ItemProductRef,
    /// Requested units. Must be at least 1.
    pub quantity: i64,
}

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The item list was missing or empty.
    #[error("order must contain at least one item")]
    Empty,

    /// A demo placeholder product was submitted.
    #[error("sample products cannot be purchased")]
    SampleProduct,

    /// A product reference that names neither a catalog ID nor a sample.
    #[error("invalid product reference: {0}")]
    InvalidProductRef(String),

    /// A quantity below 1 (or beyond range).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// A referenced product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A product has fewer units than requested.
    #[error("insufficient stock for {0}")]
    InsufficientStock(String),

    /// The order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// A status value outside pending/completed/cancelled.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Could not find a free order number.
    #[error("order number collision persisted across retries")]
    NumberCollision,

    /// The caller's role does not permit the operation.
    #[error(transparent)]
    RoleDenied(#[from] RoleDenied),

    /// Total computation overflowed.
    #[error("order total: {0}")]
    Amount(#[from] PriceError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order placement and status-transition service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// List orders visible to the caller: buyers see their own, staff see
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if a query fails.
    pub async fn list_for(&self, user: &CurrentUser) -> Result<Vec<Order>, OrderError> {
        let orders = if user.role.is_staff() {
            self.orders.list_all().await?
        } else {
            self.orders.list_for_buyer(user.id).await?
        };

        Ok(orders)
    }

    /// Place an order: validate every item, decrement stock, persist the
    /// order - all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Empty`, `SampleProduct`, `InvalidProductRef`,
    /// or `InvalidQuantity` before any state is touched;
    /// `ProductNotFound`/`InsufficientStock` abort the transaction with no
    /// stock mutated.
    pub async fn place_order(
        &self,
        buyer: &CurrentUser,
        items: &[OrderItemRequest],
    ) -> Result<Order, OrderError> {
        let lines = validate_items(items)?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let mut total_amount = Price::ZERO;
        let mut snapshots = Vec::with_capacity(lines.len());

        for (product_id, quantity) in lines {
            let product = product_for_update(&mut *tx, product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(product_id))?;

            if product.stock < quantity {
                return Err(OrderError::InsufficientStock(product.name));
            }

            #[allow(clippy::cast_sign_loss)] // validated >= 1 above
            let line_total = product.price.checked_mul(quantity as u32)?;
            total_amount = total_amount.checked_add(line_total)?;

            snapshots.push(OrderItem {
                product_id: product.id,
                name: product.name,
                price: product.price,
                quantity,
                image: product.image,
            });

            decrement_stock(&mut *tx, product_id, quantity).await?;
        }

        let (order_id, number, created_at, updated_at) =
            insert_with_fresh_number(&mut *tx, buyer, total_amount).await?;

        insert_items(&mut *tx, order_id, &snapshots).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_id = %order_id,
            order_number = %number,
            buyer_id = %buyer.id,
            items = snapshots.len(),
            "order placed"
        );

        Ok(Order {
            id: order_id,
            order_number: number,
            buyer_id: UserRef::Expanded(buyer.summary()),
            items: snapshots,
            total_amount,
            status: OrderStatus::Pending,
            created_at,
            updated_at,
        })
    }

    /// Transition an order's status. Staff only; the target status must be
    /// one of the three defined values.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::RoleDenied` for buyers,
    /// `OrderError::InvalidStatus` for unknown status values, and
    /// `OrderError::OrderNotFound` for unresolvable IDs.
    pub async fn update_status(
        &self,
        user: &CurrentUser,
        id: OrderId,
        status: &str,
    ) -> Result<Order, OrderError> {
        ensure_role(user, STAFF_ROLES)?;

        let status = status
            .parse::<OrderStatus>()
            .map_err(|_| OrderError::InvalidStatus(status.to_owned()))?;

        // Any of the three states is reachable from any other; cancellation
        // does not restock items.
        self.orders
            .update_status(id, status)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }
}

/// Reject placeholder and malformed items before the transaction starts.
fn validate_items(items: &[OrderItemRequest]) -> Result<Vec<(ProductId, i32)>, OrderError> {
    if items.is_empty() {
        return Err(OrderError::Empty);
    }

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        if item.product_id.is_sample() {
            return Err(OrderError::SampleProduct);
        }

        let product_id = item
            .product_id
            .resolve()
            .ok_or_else(|| OrderError::InvalidProductRef(item.product_id.to_string()))?;

        let quantity =
            i32::try_from(item.quantity).map_err(|_| OrderError::InvalidQuantity(item.quantity))?;
        if quantity < 1 {
            return Err(OrderError::InvalidQuantity(item.quantity));
        }

        lines.push((product_id, quantity));
    }

    Ok(lines)
}

/// Insert the order header, retrying with a fresh number on a unique-index
/// collision.
async fn insert_with_fresh_number(
    tx: &mut sqlx::PgConnection,
    buyer: &CurrentUser,
    total_amount: Price,
) -> Result<
    (
        OrderId,
        OrderNumber,
        chrono::DateTime<Utc>,
        chrono::DateTime<Utc>,
    ),
    OrderError,
> {
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let number = generate_order_number();
        match insert_order(&mut *tx, &number, buyer.id, total_amount).await {
            Ok((id, created_at, updated_at)) => return Ok((id, number, created_at, updated_at)),
            Err(RepositoryError::Conflict(_)) => continue,
            Err(other) => return Err(other.into()),
        }
    }

    Err(OrderError::NumberCollision)
}

/// Generate an order number: `ORD-<unix-millis>-<random suffix>`.
fn generate_order_number() -> OrderNumber {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_NUMBER_SUFFIX_LENGTH)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();

    OrderNumber::new(format!("{}{millis}-{suffix}", OrderNumber::PREFIX))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(product_id: &str, quantity: i64) -> OrderItemRequest {
        OrderItemRequest {
            product_id: serde_json::from_str(product_id).unwrap(),
            quantity,
        }
    }

    #[test]
    fn test_empty_order_rejected() {
        assert!(matches!(validate_items(&[]), Err(OrderError::Empty)));
    }

    #[test]
    fn test_sample_product_rejected() {
        let items = [item("1", 1), item("\"sample-2\"", 1)];
        assert!(matches!(
            validate_items(&items),
            Err(OrderError::SampleProduct)
        ));
    }

    #[test]
    fn test_unresolvable_reference_rejected() {
        let items = [item("\"walnut-chair\"", 1)];
        assert!(matches!(
            validate_items(&items),
            Err(OrderError::InvalidProductRef(_))
        ));
    }

    #[test]
    fn test_zero_and_negative_quantities_rejected() {
        for quantity in [0, -1, i64::from(i32::MAX) + 1] {
            let items = [item("1", quantity)];
            assert!(matches!(
                validate_items(&items),
                Err(OrderError::InvalidQuantity(_))
            ));
        }
    }

    #[test]
    fn test_valid_items_resolve_in_submission_order() {
        let items = [item("3", 2), item("\"7\"", 1)];
        let lines = validate_items(&items).unwrap();
        assert_eq!(
            lines,
            vec![(ProductId::new(3), 2), (ProductId::new(7), 1)]
        );
    }

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        let text = number.as_str();
        assert!(text.starts_with("ORD-"));

        let mut parts = text.splitn(3, '-');
        assert_eq!(parts.next(), Some("ORD"));
        let millis = parts.next().unwrap();
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), ORDER_NUMBER_SUFFIX_LENGTH);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_order_numbers_do_not_repeat() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert_ne!(a, b);
    }
}
