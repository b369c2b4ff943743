//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod storage;

pub use crypto::PasswordHasher;
pub use database::{close_database, init_database, DatabaseConfig, SeaOrmAccountStore};
pub use storage::InMemoryAccountStore;
