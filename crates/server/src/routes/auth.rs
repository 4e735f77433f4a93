//! Auth route handlers.
//!
//! JSON endpoints for registration, login, and logout. A successful login
//! stores the identity in the session; everything role-gated downstream
//! reads it from there.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Request to create an account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `buyer` (default), `seller`, or `admin`.
    pub role: Option<String>,
}

/// Create an account.
///
/// POST /auth/register
///
/// # Errors
///
/// 400 for missing/invalid fields, 409 for a duplicate email.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let (Some(name), Some(email), Some(password)) = (&req.name, &req.email, &req.password) else {
        return Err(AppError::BadRequest("Missing required fields".to_owned()));
    };

    let auth = AuthService::new(state.pool());
    let user = auth
        .register(name, email, password, req.role.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Account created", "user": user })),
    ))
}

/// Request to log in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Password login.
///
/// POST /auth/login
///
/// # Errors
///
/// 400 for missing fields, 401 for bad credentials.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let (Some(email), Some(password)) = (&req.email, &req.password) else {
        return Err(AppError::BadRequest("Missing required fields".to_owned()));
    };

    let auth = AuthService::new(state.pool());
    let user = auth.login(email, password).await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(json!({ "user": user })))
}

/// Clear the session.
///
/// POST /auth/logout
///
/// # Errors
///
/// Returns an error only if the session store fails.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// The current session identity.
///
/// GET /auth/me
///
/// Re-resolves the account so a deleted account doesn't keep a working
/// session identity.
///
/// # Errors
///
/// 401 when not logged in or the account no longer exists.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<crate::models::User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_owned()))?;

    Ok(Json(user))
}
