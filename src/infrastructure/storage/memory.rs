//! In-memory account store

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::{filter_accounts, Account, AccountStore, DomainError, DomainResult};

/// In-memory storage for development and testing.
///
/// Reads go straight to the map. Writes are serialized by `write_lock` so the
/// unique-constraint check and the write it guards happen as one step, the
/// same guarantee a database unique index gives.
pub struct InMemoryAccountStore {
    accounts: DashMap<String, Account>,
    enforce_unique: bool,
    write_lock: Mutex<()>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::with_unique_constraints(true)
    }

    /// A store that does (`true`) or does not (`false`) reject duplicate
    /// usernames and emails on its own.
    pub fn with_unique_constraints(enforce_unique: bool) -> Self {
        Self {
            accounts: DashMap::new(),
            enforce_unique,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> DomainResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| DomainError::Storage("in-memory store lock poisoned".into()))
    }

    fn collides(&self, id: &str, username: Option<&str>, email: Option<&str>) -> Option<String> {
        self.accounts.iter().find_map(|entry| {
            let other = entry.value();
            if other.id == id {
                return None;
            }
            if username.is_some_and(|u| other.username == u) {
                return Some(format!("username '{}' is taken", other.username));
            }
            if email.is_some_and(|e| other.email == e) {
                return Some(format!("email '{}' is taken", other.email));
            }
            None
        })
    }

    fn sorted(mut accounts: Vec<Account>) -> Vec<Account> {
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        accounts
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn count(&self) -> DomainResult<u64> {
        Ok(self.accounts.len() as u64)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>> {
        Ok(self.accounts.get(id).map(|a| a.value().clone()))
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> DomainResult<Vec<Account>> {
        let hits = self
            .accounts
            .iter()
            .filter(|a| a.username == username || a.email == email)
            .map(|a| a.value().clone())
            .collect();
        Ok(Self::sorted(hits))
    }

    async fn search_by_pattern(&self, pattern: &str) -> DomainResult<Vec<Account>> {
        let all = self.list_all().await?;
        Ok(filter_accounts(all, pattern))
    }

    async fn list_all(&self) -> DomainResult<Vec<Account>> {
        let all = self.accounts.iter().map(|a| a.value().clone()).collect();
        Ok(Self::sorted(all))
    }

    async fn insert(&self, account: Account) -> DomainResult<()> {
        let _guard = self.lock()?;

        if self.accounts.contains_key(&account.id) {
            return Err(DomainError::DuplicateKey(format!("id '{}' is taken", account.id)));
        }
        if self.enforce_unique {
            if let Some(reason) = self.collides(
                &account.id,
                Some(account.username.as_str()),
                Some(account.email.as_str()),
            ) {
                return Err(DomainError::DuplicateKey(reason));
            }
        }

        self.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    async fn update_username(&self, id: &str, new_username: &str) -> DomainResult<()> {
        let _guard = self.lock()?;

        if !self.accounts.contains_key(id) {
            return Err(DomainError::account_not_found(id));
        }
        if self.enforce_unique {
            if let Some(reason) = self.collides(id, Some(new_username), None) {
                return Err(DomainError::DuplicateKey(reason));
            }
        }

        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| DomainError::account_not_found(id))?;
        account.username = new_username.to_string();
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let _guard = self.lock()?;

        match self.accounts.remove(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::account_not_found(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(username: &str, email: &str) -> Account {
        let now = Utc::now();
        Account {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            email: email.into(),
            password_hash: "$2b$04$hash".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_unique_constraints_enforced_by_default() {
        let store = InMemoryAccountStore::new();
        store.insert(account("alice", "alice@x.com")).await.unwrap();

        let err = store.insert(account("bob", "alice@x.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateKey(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_without_unique_constraints_allows_duplicates() {
        let store = InMemoryAccountStore::with_unique_constraints(false);
        store.insert(account("alice", "alice@x.com")).await.unwrap();
        store.insert(account("alice", "alice@x.com")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_username_collision() {
        let store = InMemoryAccountStore::new();
        let alice = account("alice", "alice@x.com");
        let alice_id = alice.id.clone();
        store.insert(alice).await.unwrap();
        store.insert(account("bob", "bob@y.com")).await.unwrap();

        let err = store.update_username(&alice_id, "bob").await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateKey(_)));

        // Renaming to its own current name is not a collision.
        store.update_username(&alice_id, "alice").await.unwrap();
    }

    #[tokio::test]
    async fn test_search_and_delete() {
        let store = InMemoryAccountStore::new();
        let alice = account("alice", "alice@x.com");
        let alice_id = alice.id.clone();
        store.insert(alice).await.unwrap();
        store.insert(account("bob", "bob@y.com")).await.unwrap();

        let hits = store.search_by_pattern("ALI").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "alice");

        store.delete(&alice_id).await.unwrap();
        let err = store.delete(&alice_id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(store.search_by_pattern("ali").await.unwrap().is_empty());
    }
}
