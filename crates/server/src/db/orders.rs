//! Order repository for database operations.
//!
//! Reads go through [`OrderRepository`]. The write path of order placement
//! is split into connection-scoped helpers (`product_for_update`,
//! `decrement_stock`, `insert_order`, `insert_items`) so the order service
//! can run the whole sequence inside one transaction and roll every stock
//! decrement back when any item fails.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use heartwood_core::{
    Email, OrderId, OrderNumber, OrderStatus, Price, ProductId, UserId, UserRef, UserSummary,
};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem};

/// A product row as seen by the order flow: just what the stock check and
/// the line-item snapshot need, locked `FOR UPDATE` for the rest of the
/// transaction.
#[derive(Debug, sqlx::FromRow)]
pub struct ProductForOrder {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub stock: i32,
    /// First image URL, or empty when the listing has none.
    pub image: String,
}

/// Lock a product row for the duration of the transaction.
///
/// The row lock serializes concurrent order placements touching the same
/// product: the second caller blocks here until the first commits or rolls
/// back, so its stock check sees the decremented count.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn product_for_update(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<ProductForOrder>, RepositoryError> {
    let row = sqlx::query_as::<_, ProductForOrder>(
        r"
        SELECT id, name, price, stock, COALESCE(images[1], '') AS image
        FROM product
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// Decrement a locked product's stock.
///
/// The caller has already verified `stock >= quantity` under the row lock;
/// the `stock >= 0` check constraint is the storage-level backstop.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product vanished, or
/// `RepositoryError::Database` if the query fails.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE product
        SET stock = stock - $2, updated_at = now()
        WHERE id = $1 AND stock >= $2
        ",
    )
    .bind(id)
    .bind(quantity)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Insert the order header.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the order number is already taken,
/// or `RepositoryError::Database` for other database errors.
pub async fn insert_order(
    conn: &mut PgConnection,
    number: &OrderNumber,
    buyer_id: UserId,
    total_amount: Price,
) -> Result<(OrderId, DateTime<Utc>, DateTime<Utc>), RepositoryError> {
    let row = sqlx::query_as::<_, (OrderId, DateTime<Utc>, DateTime<Utc>)>(
        r#"
        INSERT INTO "order" (order_number, buyer_id, total_amount, status)
        VALUES ($1, $2, $3, 'pending')
        RETURNING id, created_at, updated_at
        "#,
    )
    .bind(number)
    .bind(buyer_id)
    .bind(total_amount)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict("order number already taken".to_owned());
        }
        RepositoryError::Database(e)
    })?;

    Ok(row)
}

/// Insert the line-item snapshots, preserving submission order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any insert fails.
pub async fn insert_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    items: &[OrderItem],
) -> Result<(), RepositoryError> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO order_item (order_id, position, product_id, name, price, quantity, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(order_id)
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.quantity)
        .bind(&item.image)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Repository for order reads and status updates.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every order, newest first. Seller/admin view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&select_orders("ORDER BY o.created_at DESC"))
            .fetch_all(self.pool)
            .await?;

        self.assemble(rows).await
    }

    /// List one buyer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&select_orders(
            "WHERE o.buyer_id = $1 ORDER BY o.created_at DESC",
        ))
        .bind(buyer_id)
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Get a single order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&select_orders("WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.assemble(vec![row]).await?.into_iter().next())
    }

    /// Set an order's status.
    ///
    /// Returns the updated order, or `None` if the ID doesn't resolve.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE "order"
            SET status = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Attach line items to header rows, preserving submission order.
    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();

        let item_rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT order_id, product_id, name, price, quantity, image
            FROM order_item
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            items.entry(row.order_id).or_default().push(OrderItem {
                product_id: row.product_id,
                name: row.name,
                price: row.price,
                quantity: row.quantity,
                image: row.image,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect())
    }
}

/// Shared projection for order reads; `tail` is the WHERE/ORDER suffix.
fn select_orders(tail: &str) -> String {
    format!(
        r#"
        SELECT o.id, o.order_number, o.buyer_id,
               u.name AS buyer_name, u.email AS buyer_email,
               o.total_amount, o.status, o.created_at, o.updated_at
        FROM "order" o
        LEFT JOIN "user" u ON u.id = o.buyer_id
        {tail}
        "#
    )
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: OrderNumber,
    buyer_id: UserId,
    buyer_name: Option<String>,
    buyer_email: Option<Email>,
    total_amount: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        let buyer_id = match (self.buyer_name, self.buyer_email) {
            (Some(name), Some(email)) => UserRef::Expanded(UserSummary {
                id: self.buyer_id,
                name,
                email,
            }),
            _ => UserRef::Id(self.buyer_id),
        };

        Order {
            id: self.id,
            order_number: self.order_number,
            buyer_id,
            items,
            total_amount: self.total_amount,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    order_id: OrderId,
    product_id: ProductId,
    name: String,
    price: Price,
    quantity: i32,
    image: String,
}
