//! # User Directory
//!
//! Account store with duplicate-checked sign-up, bcrypt credential
//! verification and case-insensitive search.
//!
//! ## Architecture
//!
//! - **domain**: Account entity, search predicate, `AccountStore` trait
//! - **application**: `AccountService` use-cases (create, search, rename, delete)
//! - **infrastructure**: SeaORM and in-memory stores, migrations, password hashing
//! - **runtime**: pool lifecycle and tracing setup for embedding processes
//!
//! HTTP routing and rendering are left to the embedding transport, which maps
//! [`DomainError`] variants onto its own responses.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod runtime;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

pub use application::AccountService;
pub use domain::{Account, AccountProfile, AccountStore, AccountSummary};
pub use shared::{DomainError, DomainResult};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, InMemoryAccountStore, SeaOrmAccountStore};

pub use runtime::{init_tracing, DirectoryHandle, RuntimeOptions};
