//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in account in route handlers,
//! plus the single role-capability check every mutating operation goes
//! through.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use heartwood_core::Role;

use crate::models::{CurrentUser, session_keys};

/// Roles allowed to run the marketplace side: listings and order statuses.
pub const STAFF_ROLES: &[Role] = &[Role::Seller, Role::Admin];

/// Capability check shared by every role-gated operation.
///
/// # Errors
///
/// Returns [`RoleDenied`] (mapped to 403) when the caller's role is not in
/// `allowed`.
pub fn ensure_role(user: &CurrentUser, allowed: &'static [Role]) -> Result<(), RoleDenied> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(RoleDenied { allowed })
    }
}

/// The caller is authenticated but holds none of the allowed roles.
#[derive(Debug)]
pub struct RoleDenied {
    allowed: &'static [Role],
}

impl std::error::Error for RoleDenied {}

impl std::fmt::Display for RoleDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "requires ")?;
        for (i, role) in self.allowed.iter().enumerate() {
            if i > 0 {
                write!(f, " or ")?;
            }
            write!(f, "{role}")?;
        }
        write!(f, " role")
    }
}

/// Extractor that requires a logged-in account.
///
/// Rejects with a JSON 401 when no session identity is present.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the caller is not
/// logged in.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthorized" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        // Get the current user from the session
        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(session_keys::CURRENT_USER).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heartwood_core::{Email, UserId};

    fn user_with(role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            name: "Test".to_owned(),
            email: Email::parse("test@example.com").expect("valid email"),
            role,
        }
    }

    #[test]
    fn test_staff_roles_admit_sellers_and_admins() {
        assert!(ensure_role(&user_with(Role::Seller), STAFF_ROLES).is_ok());
        assert!(ensure_role(&user_with(Role::Admin), STAFF_ROLES).is_ok());
        assert!(ensure_role(&user_with(Role::Buyer), STAFF_ROLES).is_err());
    }

    #[test]
    fn test_role_denied_message_names_roles() {
        let err = ensure_role(&user_with(Role::Buyer), STAFF_ROLES).expect_err("buyer is denied");
        assert_eq!(err.to_string(), "requires seller or admin role");
    }
}
