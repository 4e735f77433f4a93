//! Account roles and the capability checks gated on them.

use serde::{Deserialize, Serialize};

/// Account role, gating which operations an identity may perform.
///
/// Stored in Postgres as the `user_role` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "user_role", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Places orders; sees only their own orders.
    #[default]
    Buyer,
    /// Lists products and manages order statuses.
    Seller,
    /// Full access, including other sellers' products.
    Admin,
}

impl Role {
    /// Sellers and admins run the marketplace side: product listings and
    /// order status management.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Seller | Self::Admin)
    }

    /// Admins bypass per-seller ownership checks.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_capability() {
        assert!(!Role::Buyer.is_staff());
        assert!(Role::Seller.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn test_admin_capability() {
        assert!(!Role::Buyer.is_admin());
        assert!(!Role::Seller.is_admin());
        assert!(Role::Admin.is_admin());
    }

    #[test]
    fn test_parse_round_trip() {
        for role in [Role::Buyer, Role::Seller, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Seller).unwrap(), "\"seller\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
