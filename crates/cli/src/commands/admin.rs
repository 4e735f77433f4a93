//! Admin account management.
//!
//! Self-service registration defaults to buyer/seller roles; deployments
//! bootstrap their first admin here.

use heartwood_server::db;
use heartwood_server::services::AuthService;

use super::{CommandError, database_url};

/// Create an admin account.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable, the email is
/// taken, or the password fails validation.
pub async fn create_account(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to marketplace database...");
    let pool = db::create_pool(&database_url).await?;

    let auth = AuthService::new(&pool);
    let user = auth.register(name, email, password, Some("admin")).await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Admin account created");
    Ok(())
}
