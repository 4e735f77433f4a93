//! Product listing domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use heartwood_core::{CategoryId, Price, ProductId, UserId, UserRef};

/// A seller's product listing.
///
/// `seller_id` is populated (`{id, name, email}`) when the owning account
/// still resolves, and degrades to the bare ID otherwise; ownership checks
/// go through [`Product::owner_id`], which normalizes both shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Listing title.
    pub name: String,
    /// Listing description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Free-text category name.
    pub category: String,
    /// Resolved category reference, when the name matched a known category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Image URLs in display order; the first is the thumbnail snapshotted
    /// into order items.
    pub images: Vec<String>,
    /// Units available for purchase. Never negative.
    pub stock: i32,
    /// The owning seller.
    pub seller_id: UserRef,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
    /// When the listing was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The normalized owner account ID used by the ownership guard.
    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        self.seller_id.id()
    }

    /// The thumbnail snapshotted into order items; empty when the listing
    /// carries no images.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images.first().map_or("", String::as_str)
    }
}
