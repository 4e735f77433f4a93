//! Product repository for database operations.
//!
//! Catalog queries embed the owning seller (`LEFT JOIN "user"`), so a
//! listing's `seller_id` comes back populated unless the account is gone.
//! The `stock` column is only written here through full-listing updates;
//! order placement decrements it through the order flow's transaction
//! (see `db::orders`).

use sqlx::PgPool;

use heartwood_core::{CategoryId, Email, Price, ProductId, UserId, UserRef, UserSummary};

use super::RepositoryError;
use crate::models::product::Product;

/// Fields for a new listing. The seller is always the creating account.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub images: Vec<String>,
    pub stock: i32,
    pub seller_id: UserId,
}

/// Partial update of a listing; `None` fields keep their current value.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub category_id: Option<CategoryId>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i32>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&select_products("ORDER BY p.created_at DESC"))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&select_products("WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(ProductRow::into_product))
    }

    /// Create a new listing.
    ///
    /// The free-text category name is resolved to a `category_id` when it
    /// matches a known category; unknown names are kept as plain text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails, or
    /// `RepositoryError::DataCorruption` if the inserted row cannot be read
    /// back.
    pub async fn create(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let category_id = sqlx::query_scalar::<_, CategoryId>(
            r"
            SELECT id FROM category WHERE lower(name) = lower($1)
            ",
        )
        .bind(&new.category)
        .fetch_optional(self.pool)
        .await?;

        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO product (name, description, price, category, category_id, images, stock, seller_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.category)
        .bind(category_id)
        .bind(&new.images)
        .bind(new.stock)
        .bind(new.seller_id)
        .fetch_one(self.pool)
        .await?;

        self.get(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("created product {id} not readable"))
        })
    }

    /// Apply a partial update to a listing.
    ///
    /// Returns `None` if the product doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                category = COALESCE($5, category),
                category_id = COALESCE($6, category_id),
                images = COALESCE($7, images),
                stock = COALESCE($8, stock),
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.category.as_deref())
        .bind(changes.category_id)
        .bind(changes.images.as_deref())
        .bind(changes.stock)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Delete a listing.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM product WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Shared projection for product reads; `tail` is the WHERE/ORDER suffix.
fn select_products(tail: &str) -> String {
    format!(
        r#"
        SELECT p.id, p.name, p.description, p.price, p.category, p.category_id,
               p.images, p.stock, p.seller_id,
               u.name AS seller_name, u.email AS seller_email,
               p.created_at, p.updated_at
        FROM product p
        LEFT JOIN "user" u ON u.id = p.seller_id
        {tail}
        "#
    )
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    category: String,
    category_id: Option<CategoryId>,
    images: Vec<String>,
    stock: i32,
    seller_id: UserId,
    seller_name: Option<String>,
    seller_email: Option<Email>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl ProductRow {
    fn into_product(self) -> Product {
        let seller_id = match (self.seller_name, self.seller_email) {
            (Some(name), Some(email)) => UserRef::Expanded(UserSummary {
                id: self.seller_id,
                name,
                email,
            }),
            _ => UserRef::Id(self.seller_id),
        };

        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            category_id: self.category_id,
            images: self.images,
            stock: self.stock,
            seller_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
