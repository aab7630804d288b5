use migration::{DirectoryMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::config::BootstrapSettings;
use crate::errors::InternalError;
use crate::errors::internal::DatabaseError;

/// Open the connection pool
///
/// Does NOT run migrations - call [`migrate_database`] separately.
pub async fn init_database(settings: &BootstrapSettings) -> Result<DatabaseConnection, InternalError> {
    let db = Database::connect(settings.database_url())
        .await
        .map_err(|e| InternalError::database("connect_database", e))?;

    tracing::debug!("Connected to database");

    Ok(db)
}

/// Run all pending migrations
pub async fn migrate_database(db: &DatabaseConnection) -> Result<(), InternalError> {
    DirectoryMigrator::up(db, None)
        .await
        .map_err(|e| InternalError::database("run_migrations", e))?;

    tracing::debug!("Database migrations completed");

    Ok(())
}

/// Close the pool after the server has stopped accepting requests
pub async fn close_database(db: DatabaseConnection) -> Result<(), InternalError> {
    db.close()
        .await
        .map_err(|source| InternalError::Database(DatabaseError::Close { source }))?;

    tracing::debug!("Database connection pool closed");

    Ok(())
}
