//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! crm-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CRM_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use tracing::info;

use crm_server::db;

use super::config_with_database;

/// Apply all pending migrations to the configured database.
///
/// # Errors
///
/// Returns an error if no database is configured, the connection fails or a
/// migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config_with_database()?;
    let Some(database_url) = config.store.database_url.as_ref() else {
        return Err("CRM_DATABASE_URL not set".into());
    };

    info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;

    info!("Running migrations...");
    db::run_migrations(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
