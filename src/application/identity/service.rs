//! Account management service — application-layer orchestration
//!
//! Duplicate detection, password hashing/verification and search filtering
//! live here. Transport layers hand in plain data and map the returned
//! `DomainError` variants onto their own responses.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use crate::domain::{
    normalize_term, Account, AccountProfile, AccountStore, AccountSummary, CreateAccountDto,
    DomainError, DomainResult,
};
use crate::infrastructure::crypto::PasswordHasher;

pub const DUPLICATE_ACCOUNT_MESSAGE: &str = "Username or Email already exists";
pub const INCORRECT_PASSWORD_MESSAGE: &str = "incorrect password";

/// Account service — orchestrates every account use-case.
///
/// Generic over `S: AccountStore` so it stays decoupled from the concrete
/// persistence layer; `S` may be `dyn AccountStore`.
pub struct AccountService<S: AccountStore + ?Sized> {
    store: Arc<S>,
    hasher: PasswordHasher,
}

impl<S: AccountStore + ?Sized> AccountService<S> {
    pub fn new(store: Arc<S>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Every account, credential excluded.
    pub async fn list_all(&self) -> DomainResult<Vec<AccountProfile>> {
        let accounts = self.store.list_all().await?;
        Ok(accounts.into_iter().map(AccountProfile::from).collect())
    }

    /// Case-insensitive substring search on username or email. No term (or
    /// an empty one) lists everything.
    pub async fn search(&self, term: Option<&str>) -> DomainResult<Vec<AccountProfile>> {
        let Some(term) = normalize_term(term) else {
            return self.list_all().await;
        };
        let accounts = self.store.search_by_pattern(term).await?;
        Ok(accounts.into_iter().map(AccountProfile::from).collect())
    }

    /// Full collection count, plus matches only when a term was given.
    pub async fn get_summary(&self, term: Option<&str>) -> DomainResult<AccountSummary> {
        let total_count = self.store.count().await?;
        let matches = match normalize_term(term) {
            Some(term) => self.search(Some(term)).await?,
            None => Vec::new(),
        };
        Ok(AccountSummary {
            total_count,
            matches,
        })
    }

    /// Look up a single account by ID.
    pub async fn find(&self, id: &str) -> DomainResult<Option<AccountProfile>> {
        Ok(self.store.find_by_id(id).await?.map(AccountProfile::from))
    }

    /// Check `password` against the account's stored hash.
    pub async fn verify_credentials(&self, id: &str, password: &str) -> DomainResult<bool> {
        let account = self.fetch(id).await?;
        self.hasher.verify(password, &account.password_hash).await
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Register a new account.
    ///
    /// The duplicate check and the insert are separate statements; a store
    /// with unique constraints catches what slips between them, and that is
    /// reported as the same duplicate error.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<AccountProfile> {
        let dto = CreateAccountDto {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        dto.validate()
            .map_err(|e| DomainError::Validation(e.to_string()))?;

        let existing = self
            .store
            .find_by_username_or_email(&dto.username, &dto.email)
            .await?;
        if !existing.is_empty() {
            info!(username = %dto.username, "Rejected duplicate account");
            return Err(DomainError::Conflict(DUPLICATE_ACCOUNT_MESSAGE.into()));
        }

        let password_hash = self.hasher.hash(&dto.password).await?;
        let now = Utc::now();
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            username: dto.username,
            email: dto.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert(account.clone()).await {
            Ok(()) => {}
            Err(DomainError::DuplicateKey(reason)) => {
                warn!(username = %account.username, %reason, "Store rejected duplicate account");
                return Err(DomainError::Conflict(DUPLICATE_ACCOUNT_MESSAGE.into()));
            }
            Err(e) => return Err(e),
        }

        metrics::counter!("accounts_created_total").increment(1);
        info!(account_id = %account.id, username = %account.username, "Account created");
        Ok(account.into())
    }

    /// Change the username after confirming the account's password. The
    /// account and password are checked before the new name is validated.
    ///
    /// The new name is not checked against other accounts here; a store with
    /// unique constraints reports a collision as `DuplicateKey`.
    pub async fn rename(&self, id: &str, new_username: &str, password: &str) -> DomainResult<()> {
        self.confirm_password(id, password).await?;

        if new_username.is_empty() {
            return Err(DomainError::Validation("Username must not be empty".into()));
        }
        self.store.update_username(id, new_username).await?;

        metrics::counter!("accounts_renamed_total").increment(1);
        info!(account_id = id, username = new_username, "Account renamed");
        Ok(())
    }

    /// Delete the account after confirming its password.
    pub async fn delete(&self, id: &str, password: &str) -> DomainResult<()> {
        self.confirm_password(id, password).await?;
        self.store.delete(id).await?;

        metrics::counter!("accounts_deleted_total").increment(1);
        info!(account_id = id, "Account deleted");
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn fetch(&self, id: &str) -> DomainResult<Account> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::account_not_found(id))
    }

    async fn confirm_password(&self, id: &str, password: &str) -> DomainResult<Account> {
        let account = self.fetch(id).await?;
        if !self.hasher.verify(password, &account.password_hash).await? {
            metrics::counter!("account_auth_failures_total").increment(1);
            warn!(account_id = id, "Password confirmation failed");
            return Err(DomainError::Unauthorized(INCORRECT_PASSWORD_MESSAGE.into()));
        }
        Ok(account)
    }
}
