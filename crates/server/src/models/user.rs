//! User account domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use heartwood_core::{Email, Role, UserId, UserSummary};

/// A marketplace account (domain type).
///
/// The password hash lives in the `user_password` table and is only ever
/// loaded by the auth service; it has no field here, so serializing a `User`
/// can never leak it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique across accounts).
    pub email: Email,
    /// Account role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The populated reference embedded in order and product payloads.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}
