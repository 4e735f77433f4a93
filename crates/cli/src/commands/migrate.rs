//! Database migration command.
//!
//! Runs the embedded schema migrations from `crates/server/migrations/`
//! followed by the tower-sessions store tables.
//!
//! # Environment Variables
//!
//! - `HEARTWOOD_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string

use tower_sessions_sqlx_store::PostgresStore;

use heartwood_server::db;

use super::{CommandError, database_url};

/// Run all migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to marketplace database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running schema migrations...");
    db::MIGRATOR.run(&pool).await?;

    tracing::info!("Creating session store tables...");
    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
