//! Owner-scoped product management.
//!
//! Every mutation goes through the shared role check plus an owner-or-admin
//! comparison on the normalized owner ID; other sellers are indistinguishable
//! from buyers here.

use sqlx::PgPool;
use thiserror::Error;

use heartwood_core::ProductId;

use crate::db::RepositoryError;
use crate::db::products::{NewProduct, ProductChanges, ProductRepository};
use crate::middleware::{RoleDenied, STAFF_ROLES, ensure_role};
use crate::models::product::Product;
use crate::models::session::CurrentUser;

/// Errors that can occur during product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// The product does not exist.
    #[error("product not found")]
    NotFound,

    /// The caller's role does not permit listing management.
    #[error(transparent)]
    RoleDenied(#[from] RoleDenied),

    /// The caller is staff but does not own this listing.
    #[error("you can only manage your own products")]
    NotOwner,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Product management service.
pub struct ProductService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// List all products, newest first. Public.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` if a query fails.
    pub async fn list(&self) -> Result<Vec<Product>, ProductError> {
        Ok(self.products.list().await?)
    }

    /// Get a single product. Public.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the ID doesn't resolve.
    pub async fn get(&self, id: ProductId) -> Result<Product, ProductError> {
        self.products.get(id).await?.ok_or(ProductError::NotFound)
    }

    /// Create a listing owned by the caller. Staff only.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::RoleDenied` for buyers.
    pub async fn create(
        &self,
        user: &CurrentUser,
        mut new: NewProduct,
    ) -> Result<Product, ProductError> {
        ensure_role(user, STAFF_ROLES)?;

        // The seller is always the creating account, whatever the request said
        new.seller_id = user.id;

        Ok(self.products.create(new).await?)
    }

    /// Apply a partial update to a listing. Owner or admin only.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` for unknown IDs,
    /// `ProductError::RoleDenied` for buyers, and `ProductError::NotOwner`
    /// for staff who don't own the listing.
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, ProductError> {
        ensure_role(user, STAFF_ROLES)?;

        let product = self.products.get(id).await?.ok_or(ProductError::NotFound)?;
        ensure_owner_or_admin(user, &product)?;

        self.products
            .update(id, changes)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Delete a listing. Owner or admin only.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` for unknown IDs,
    /// `ProductError::RoleDenied` for buyers, and `ProductError::NotOwner`
    /// for staff who don't own the listing.
    pub async fn delete(&self, user: &CurrentUser, id: ProductId) -> Result<(), ProductError> {
        ensure_role(user, STAFF_ROLES)?;

        let product = self.products.get(id).await?.ok_or(ProductError::NotFound)?;
        ensure_owner_or_admin(user, &product)?;

        if !self.products.delete(id).await? {
            return Err(ProductError::NotFound);
        }

        Ok(())
    }
}

/// Owner-or-admin guard on the normalized owner ID.
fn ensure_owner_or_admin(user: &CurrentUser, product: &Product) -> Result<(), ProductError> {
    if product.owner_id() == user.id || user.role.is_admin() {
        Ok(())
    } else {
        Err(ProductError::NotOwner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use heartwood_core::{Email, Price, Role, UserId, UserRef, UserSummary};

    fn user(id: i32, role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            name: format!("user-{id}"),
            email: Email::parse(&format!("user{id}@example.com")).unwrap(),
            role,
        }
    }

    fn listing(seller_id: UserRef) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Walnut desk".to_owned(),
            description: "Mid-century walnut writing desk".to_owned(),
            price: Price::new(rust_decimal::Decimal::from(890)).unwrap(),
            category: "Desks".to_owned(),
            category_id: None,
            images: vec![],
            stock: 2,
            seller_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_may_manage() {
        let product = listing(UserRef::Id(UserId::new(7)));
        assert!(ensure_owner_or_admin(&user(7, Role::Seller), &product).is_ok());
    }

    #[test]
    fn test_other_seller_denied() {
        let product = listing(UserRef::Id(UserId::new(7)));
        assert!(matches!(
            ensure_owner_or_admin(&user(8, Role::Seller), &product),
            Err(ProductError::NotOwner)
        ));
    }

    #[test]
    fn test_admin_bypasses_ownership() {
        let product = listing(UserRef::Id(UserId::new(7)));
        assert!(ensure_owner_or_admin(&user(99, Role::Admin), &product).is_ok());
    }

    #[test]
    fn test_guard_sees_through_populated_owner() {
        let product = listing(UserRef::Expanded(UserSummary {
            id: UserId::new(7),
            name: "Maple & Co".to_owned(),
            email: Email::parse("shop@maple.example").unwrap(),
        }));
        assert!(ensure_owner_or_admin(&user(7, Role::Seller), &product).is_ok());
        assert!(ensure_owner_or_admin(&user(8, Role::Seller), &product).is_err());
    }
}
