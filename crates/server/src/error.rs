//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that maps the error taxonomy to HTTP
//! statuses and a JSON `{"message": ...}` body. Server errors are captured
//! to Sentry before responding, and internal detail never reaches the
//! client. All route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, OrderError, ProductError};

/// Application-level error type for the marketplace API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Product operation failed.
    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The response status and client-facing message for this error.
    fn response_parts(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_parts(err),
            Self::Auth(err) => auth_parts(err),
            Self::Order(err) => order_parts(err),
            Self::Product(err) => product_parts(err),
            Self::Session(_) | Self::Internal(_) => internal_parts(),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, format!("Forbidden: {msg}")),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.response_parts();

        // Capture server errors to Sentry; client errors are just noise
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Generic 500 without internal detail.
fn internal_parts() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_owned(),
    )
}

fn repository_parts(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => internal_parts(),
    }
}

fn auth_parts(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".to_owned())
        }
        AuthError::UserAlreadyExists => (
            StatusCode::CONFLICT,
            "An account with this email already exists".to_owned(),
        ),
        AuthError::InvalidEmail(_) => {
            (StatusCode::BAD_REQUEST, "Invalid email address".to_owned())
        }
        AuthError::InvalidName(msg) | AuthError::WeakPassword(msg) => {
            (StatusCode::BAD_REQUEST, msg.clone())
        }
        AuthError::InvalidRole(_) => (StatusCode::BAD_REQUEST, "Invalid role".to_owned()),
        AuthError::Repository(repo) => repository_parts(repo),
        AuthError::PasswordHash => internal_parts(),
    }
}

fn order_parts(err: &OrderError) -> (StatusCode, String) {
    match err {
        OrderError::Empty => (
            StatusCode::BAD_REQUEST,
            "Order must contain at least one item".to_owned(),
        ),
        OrderError::SampleProduct => (
            StatusCode::BAD_REQUEST,
            "Sample products cannot be purchased".to_owned(),
        ),
        OrderError::InvalidProductRef(reference) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid product reference: {reference}"),
        ),
        OrderError::InvalidQuantity(quantity) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid quantity: {quantity}"),
        ),
        OrderError::ProductNotFound(id) => {
            (StatusCode::NOT_FOUND, format!("Product {id} not found"))
        }
        OrderError::InsufficientStock(name) => (
            StatusCode::BAD_REQUEST,
            format!("Insufficient stock for {name}"),
        ),
        OrderError::OrderNotFound => (StatusCode::NOT_FOUND, "Order not found".to_owned()),
        OrderError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "Invalid status".to_owned()),
        OrderError::RoleDenied(denied) => {
            (StatusCode::FORBIDDEN, format!("Forbidden: {denied}"))
        }
        OrderError::Amount(_) => (
            StatusCode::BAD_REQUEST,
            "Order total out of range".to_owned(),
        ),
        OrderError::Repository(repo) => repository_parts(repo),
        OrderError::NumberCollision => internal_parts(),
    }
}

fn product_parts(err: &ProductError) -> (StatusCode, String) {
    match err {
        ProductError::NotFound => (StatusCode::NOT_FOUND, "Product not found".to_owned()),
        ProductError::RoleDenied(denied) => {
            (StatusCode::FORBIDDEN, format!("Forbidden: {denied}"))
        }
        ProductError::NotOwner => (
            StatusCode::FORBIDDEN,
            "Forbidden: you can only manage your own products".to_owned(),
        ),
        ProductError::Repository(repo) => repository_parts(repo),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Order".to_owned());
        assert_eq!(err.to_string(), "Not found: Order");

        let err = AppError::BadRequest("invalid input".to_owned());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_order_error_status_codes() {
        assert_eq!(
            get_status(AppError::Order(OrderError::Empty)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::SampleProduct)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::ProductNotFound(
                heartwood_core::ProductId::new(9)
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::InsufficientStock(
                "Oak bench".to_owned()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::InvalidStatus(
                "shipped".to_owned()
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_conflict_maps_to_409() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "email already exists".to_owned()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let err = AppError::Internal("connection pool exhausted".to_owned());
        let (_, message) = err.response_parts();
        assert_eq!(message, "Internal server error");
    }
}
