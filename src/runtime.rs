//! Reusable user-directory runtime.
//!
//! Provides [`DirectoryHandle`] that encapsulates the process-wide resource
//! lifecycle: open the connection pool, migrate, build the service, and
//! drain the pool on shutdown. Embedding transports and the CLI both start
//! from here instead of reaching for a global pool.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::application::AccountService;
use crate::config::AppConfig;
use crate::domain::{AccountStore, DomainResult};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{close_database, init_database, PasswordHasher, SeaOrmAccountStore};

/// Service type handed out by the runtime.
pub type SharedAccountService = Arc<AccountService<dyn AccountStore>>;

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the directory runtime.
pub struct RuntimeOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── DirectoryHandle ────────────────────────────────────────────────

/// Handle to an initialized directory: owns the pool, exposes the service.
///
/// ```rust,no_run
/// use user_directory::runtime::{DirectoryHandle, RuntimeOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = DirectoryHandle::start(RuntimeOptions::default()).await?;
///     let summary = handle.service().get_summary(None).await?;
///     println!("{} accounts", summary.total_count);
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct DirectoryHandle {
    /// The configuration the runtime was started with.
    pub config: AppConfig,

    db: DatabaseConnection,
    service: SharedAccountService,
}

impl DirectoryHandle {
    /// Start the runtime.
    ///
    /// This will:
    /// 1. Validate the bcrypt work factor
    /// 2. Open the connection pool and run migrations (if enabled)
    /// 3. Build the `AccountService` over a SeaORM-backed store
    pub async fn start(opts: RuntimeOptions) -> DomainResult<Self> {
        let app_cfg = opts.config;

        info!("Starting user directory...");

        let hasher = PasswordHasher::new(app_cfg.security.bcrypt_cost)?;
        info!(cost = hasher.cost(), "Password hashing configured");

        // ── Database ───────────────────────────────────────────
        let db = init_database(&app_cfg.database).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Services ───────────────────────────────────────────
        let store: Arc<dyn AccountStore> = Arc::new(SeaOrmAccountStore::new(db.clone()));
        let service = Arc::new(AccountService::new(store, hasher));

        Ok(Self {
            config: app_cfg,
            db,
            service,
        })
    }

    /// The account service, backed by this runtime's pool.
    pub fn service(&self) -> SharedAccountService {
        self.service.clone()
    }

    /// Drain and close the connection pool.
    ///
    /// In-flight operations holding a clone of the service keep working
    /// until they finish; new ones fail with a storage error.
    pub async fn shutdown(self) {
        info!("Shutting down user directory...");
        close_database(self.db).await;
        info!("User directory shutdown complete");
    }
}

// ── Tracing ────────────────────────────────────────────────────────

/// Install the global tracing subscriber from the logging config.
///
/// `RUST_LOG` overrides `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::DatabaseConfig;

    fn memory_options() -> RuntimeOptions {
        let mut config = AppConfig::default();
        config.database = DatabaseConfig::sqlite_memory();
        RuntimeOptions {
            config,
            auto_migrate: true,
        }
    }

    #[tokio::test]
    async fn test_start_migrates_and_serves() {
        let handle = DirectoryHandle::start(memory_options()).await.unwrap();
        let svc = handle.service();

        let alice = svc.create("alice", "alice@x.com", "pw1").await.unwrap();
        let summary = svc.get_summary(Some("ALI")).await.unwrap();
        assert_eq!(summary.total_count, 1);
        assert_eq!(summary.matches[0].id, alice.id);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_operations_fail_after_shutdown() {
        let handle = DirectoryHandle::start(memory_options()).await.unwrap();
        let svc = handle.service();
        handle.shutdown().await;

        let err = svc.list_all().await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }

    #[tokio::test]
    async fn test_weak_cost_refused() {
        let mut opts = memory_options();
        opts.config.security.bcrypt_cost = 4;
        let err = DirectoryHandle::start(opts).await.err().unwrap();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
