//! Database layer for yatube-rs.
//!
//! Entities for users, groups, posts, comments and follow edges, the
//! migrations that create them, and one repository per entity.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::log::LevelFilter;
use yatube_common::{AppError, AppResult, Config};

/// Open the connection pool described by `config.database`.
pub async fn init(config: &Config) -> AppResult<DatabaseConnection> {
    let settings = &config.database;
    let mut options = ConnectOptions::new(&settings.url);
    options
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    let db = Database::connect(options)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    tracing::debug!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "Database pool ready"
    );
    Ok(db)
}

/// Apply every pending migration.
pub async fn migrate(db: &DatabaseConnection) -> AppResult<()> {
    let pending = migrations::Migrator::get_pending_migrations(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    if pending.is_empty() {
        return Ok(());
    }

    tracing::info!(count = pending.len(), "Applying migrations");
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
