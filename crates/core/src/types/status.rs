//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Status of an order.
///
/// Orders start as `Pending`. Sellers and admins may move an order to any of
/// the three states; no transition graph is enforced and no state is
/// terminal. Cancelling an order does not restock its items.
///
/// Stored in Postgres as the `order_status` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_only_three_values_deserialize() {
        for (json, status) in [
            ("\"pending\"", OrderStatus::Pending),
            ("\"completed\"", OrderStatus::Completed),
            ("\"cancelled\"", OrderStatus::Cancelled),
        ] {
            let parsed: OrderStatus = serde_json::from_str(json).unwrap();
            assert_eq!(parsed, status);
        }

        // Anything outside the three states is rejected before any state change
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
        assert!(serde_json::from_str::<OrderStatus>("\"PENDING\"").is_err());
    }

    #[test]
    fn test_parse_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
    }
}
