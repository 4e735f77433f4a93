//! Normalized references to user accounts in API payloads.
//!
//! Buyer and seller fields in order and product payloads are *populated*:
//! the record embeds `{id, name, email}` instead of a bare ID. When the
//! referenced account no longer resolves, the field degrades to the bare ID.
//! [`UserRef`] accepts either shape on the wire and normalizes to a single
//! [`UserId`] before any comparison, so ownership checks never branch on the
//! representation.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;

/// The populated form of a user reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// A reference to a user account: a bare ID or an expanded summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Expanded(UserSummary),
    Id(UserId),
}

impl UserRef {
    /// The normalized account ID, whichever shape arrived.
    #[must_use]
    pub const fn id(&self) -> UserId {
        match self {
            Self::Expanded(summary) => summary.id,
            Self::Id(id) => *id,
        }
    }

    /// The populated summary, when present.
    #[must_use]
    pub const fn summary(&self) -> Option<&UserSummary> {
        match self {
            Self::Expanded(summary) => Some(summary),
            Self::Id(_) => None,
        }
    }
}

impl From<UserId> for UserRef {
    fn from(id: UserId) -> Self {
        Self::Id(id)
    }
}

impl From<UserSummary> for UserRef {
    fn from(summary: UserSummary) -> Self {
        Self::Expanded(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_bare_id() {
        let reference: UserRef = serde_json::from_str("17").unwrap();
        assert_eq!(reference.id(), UserId::new(17));
        assert!(reference.summary().is_none());
    }

    #[test]
    fn test_deserialize_expanded() {
        let json = r#"{"id": 17, "name": "Maple & Co", "email": "shop@maple.example"}"#;
        let reference: UserRef = serde_json::from_str(json).unwrap();
        assert_eq!(reference.id(), UserId::new(17));
        assert_eq!(reference.summary().unwrap().name, "Maple & Co");
    }

    #[test]
    fn test_both_shapes_normalize_equal() {
        let bare: UserRef = serde_json::from_str("3").unwrap();
        let expanded: UserRef =
            serde_json::from_str(r#"{"id": 3, "name": "A", "email": "a@b.c"}"#).unwrap();
        assert_eq!(bare.id(), expanded.id());
    }

    #[test]
    fn test_serialize_expanded_shape() {
        let reference = UserRef::from(UserSummary {
            id: UserId::new(5),
            name: "Walnut Works".to_owned(),
            email: Email::parse("sales@walnut.example").unwrap(),
        });
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["name"], "Walnut Works");
    }
}
