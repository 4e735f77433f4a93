//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use heartwood_core::{OrderId, OrderNumber, OrderStatus, Price, ProductId, UserRef};

/// A placed order.
///
/// Immutable after creation except for `status`. Items are purchase-time
/// snapshots: later edits to a product never change historical orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Human-facing order number, unique across all orders.
    pub order_number: OrderNumber,
    /// The buyer who placed the order.
    pub buyer_id: UserRef,
    /// Line items in the order they were submitted.
    pub items: Vec<OrderItem>,
    /// Sum of `price * quantity` over all items.
    pub total_amount: Price,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated (status changes only).
    pub updated_at: DateTime<Utc>,
}

/// A line item: the product as it was at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// The product this item was purchased from.
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub name: String,
    /// Unit price at purchase time.
    pub price: Price,
    /// Units purchased. At least 1.
    pub quantity: i32,
    /// Thumbnail URL at purchase time; empty when the listing had no images.
    pub image: String,
}

/// A product reference as submitted in a cart.
///
/// The catalog serves numeric IDs, but demo storefront builds ship
/// `sample-<n>` string identifiers that are not backed by inventory; those
/// must be rejected before the order flow touches the database.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItemProductRef {
    /// A real catalog ID.
    Id(ProductId),
    /// A raw string: either a stringified catalog ID or a demo placeholder.
    Raw(String),
}

impl ItemProductRef {
    /// Whether this is a demo placeholder identifier.
    #[must_use]
    pub fn is_sample(&self) -> bool {
        matches!(self, Self::Raw(s) if s.starts_with("sample-"))
    }

    /// The catalog ID, when the reference names one.
    #[must_use]
    pub fn resolve(&self) -> Option<ProductId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Raw(s) => s.parse::<i32>().ok().map(ProductId::new),
        }
    }
}

impl std::fmt::Display for ItemProductRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Raw(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_reference_resolves() {
        let reference: ItemProductRef = serde_json::from_str("42").unwrap();
        assert!(!reference.is_sample());
        assert_eq!(reference.resolve(), Some(ProductId::new(42)));
    }

    #[test]
    fn test_stringified_id_resolves() {
        let reference: ItemProductRef = serde_json::from_str("\"42\"").unwrap();
        assert!(!reference.is_sample());
        assert_eq!(reference.resolve(), Some(ProductId::new(42)));
    }

    #[test]
    fn test_sample_placeholder_detected() {
        let reference: ItemProductRef = serde_json::from_str("\"sample-3\"").unwrap();
        assert!(reference.is_sample());
        assert_eq!(reference.resolve(), None);
    }

    #[test]
    fn test_garbage_reference_does_not_resolve() {
        let reference: ItemProductRef = serde_json::from_str("\"walnut-chair\"").unwrap();
        assert!(!reference.is_sample());
        assert_eq!(reference.resolve(), None);
    }
}
