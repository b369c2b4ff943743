use async_trait::async_trait;

use super::Account;
use crate::shared::DomainResult;

/// Persistence interface for the account collection.
///
/// Every method may fail with `DomainError::Storage`, which callers surface
/// unmodified.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn count(&self) -> DomainResult<u64>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>>;

    /// Accounts whose username or email equals the given value exactly.
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> DomainResult<Vec<Account>>;

    /// Accounts accepted by [`super::matches`] for `pattern`.
    async fn search_by_pattern(&self, pattern: &str) -> DomainResult<Vec<Account>>;

    async fn list_all(&self) -> DomainResult<Vec<Account>>;

    /// Fails with `DomainError::DuplicateKey` when the store enforces
    /// uniqueness on username/email and the record collides.
    async fn insert(&self, account: Account) -> DomainResult<()>;

    /// Fails with `DomainError::NotFound` when no account has `id`.
    async fn update_username(&self, id: &str, new_username: &str) -> DomainResult<()>;

    /// Fails with `DomainError::NotFound` when no account has `id`.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
