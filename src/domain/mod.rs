//! Domain layer - account entity, search predicate and storage interface

pub mod account;

pub use account::{
    filter_accounts, matches, normalize_term, Account, AccountProfile, AccountStore,
    AccountSummary, CreateAccountDto,
};

// Re-export DomainError from shared for convenience
pub use crate::shared::{DomainError, DomainResult};
