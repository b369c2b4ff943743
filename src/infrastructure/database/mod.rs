pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmAccountStore;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Database configuration
///
/// Pool bounds and timeouts live here: the pool is the only place the
/// service bounds its latency against the storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./users.db?mode=rwc")
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    /// How long an operation may wait for a free pooled connection.
    pub acquire_timeout_secs: u64,
    /// Close idle connections after this many seconds (never when unset).
    pub idle_timeout_secs: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./users.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 10,
            acquire_timeout_secs: 10,
            idle_timeout_secs: Some(300),
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            ..Self::default()
        }
    }

    /// Private in-memory SQLite database. Pinned to a single connection
    /// that never idles out, since each SQLite memory connection is its
    /// own database.
    pub fn sqlite_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            idle_timeout_secs: None,
            ..Self::default()
        }
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let mut opts = ConnectOptions::new(self.url.clone());
        opts.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .sqlx_logging(false);
        if let Some(secs) = self.idle_timeout_secs {
            opts.idle_timeout(Duration::from_secs(secs));
        }
        opts
    }
}

/// Open the connection pool.
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!(
        url = %config.url,
        max_connections = config.max_connections,
        "Connecting to database"
    );
    let db = Database::connect(config.connect_options()).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Drain and close the connection pool.
pub async fn close_database(db: DatabaseConnection) {
    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }
}

/// Migrated in-memory database for tests.
#[cfg(test)]
pub(crate) async fn memory_database() -> DatabaseConnection {
    use sea_orm_migration::MigratorTrait;

    let db = init_database(&DatabaseConfig::sqlite_memory())
        .await
        .expect("connect to in-memory sqlite");
    migrator::Migrator::up(&db, None)
        .await
        .expect("run migrations");
    db
}
