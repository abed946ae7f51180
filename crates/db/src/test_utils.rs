//! Helpers for tests that run against a live `PostgreSQL`.
//!
//! Each [`TestDatabase::create_unique`] call creates a throwaway database,
//! runs every migration on it and hands back a connection. Call
//! [`TestDatabase::drop_database`] when done.

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// Connection settings for the test server, read from `TEST_DB_*`.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        let var = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };
        Self {
            host: var("TEST_DB_HOST", "localhost"),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: var("TEST_DB_USER", "yatube_test"),
            password: var("TEST_DB_PASSWORD", "yatube_test"),
            database: var("TEST_DB_NAME", "yatube_test"),
        }
    }
}

impl TestDbConfig {
    /// URL of the configured database.
    #[must_use]
    pub fn database_url(&self) -> String {
        self.url_for(&self.database)
    }

    /// URL of the maintenance database, used to create and drop test databases.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        self.url_for("postgres")
    }

    fn url_for(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{database}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect to the configured database and bring its schema up to date.
    pub async fn new() -> Result<Self, DbErr> {
        let config = TestDbConfig::default();
        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;
        Ok(Self { conn, config })
    }

    /// Create a fresh, uniquely named database so tests can run in parallel.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("yatube_test_{}", &suffix[..8]);

        let admin = Database::connect(&config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{}\"", config.database),
            ))
            .await?;
        admin.close().await?;

        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Created test database");
        Ok(Self { conn, config })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Empty every application table, leaving the migration history intact.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        self.conn
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                "TRUNCATE TABLE \"follow\", \"comment\", \"post\", \"group\", \"user\" CASCADE"
                    .to_string(),
            ))
            .await?;
        Ok(())
    }

    /// Drop this database. Consumes self so the connection is closed first.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close().await?;

        let admin = Database::connect(&self.config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.config.database),
            ))
            .await?;
        admin.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}
