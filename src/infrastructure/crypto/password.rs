//! Password hashing utilities
//!
//! bcrypt is CPU-bound, so the async entry points run it on tokio's
//! blocking pool and never stall the task that awaits them.

use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::warn;

use crate::shared::{DomainError, DomainResult};

/// Lowest bcrypt cost accepted outside of tests.
pub const MIN_COST: u32 = 10;

/// Hash a password using bcrypt with an explicit cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

/// Salted one-way password hashing with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> DomainResult<Self> {
        if !(MIN_COST..=31).contains(&cost) {
            return Err(DomainError::Validation(format!(
                "bcrypt cost must be between {} and 31, got {}",
                MIN_COST, cost
            )));
        }
        Ok(Self { cost })
    }

    /// Minimum bcrypt cost, for tests only.
    #[cfg(test)]
    pub(crate) fn fast() -> Self {
        Self { cost: 4 }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash with a fresh random salt.
    pub async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| DomainError::Hashing(format!("hashing task failed: {}", e)))?
            .map_err(|e| DomainError::Hashing(e.to_string()))
    }

    /// `false` for a wrong password. A stored hash that bcrypt cannot
    /// parse also counts as a mismatch.
    pub async fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let result = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| DomainError::Hashing(format!("verification task failed: {}", e)))?;

        match result {
            Ok(valid) => Ok(valid),
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be verified");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hashed = hash_password(password, 4).unwrap();

        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_cost_below_minimum_rejected() {
        assert!(matches!(PasswordHasher::new(9), Err(DomainError::Validation(_))));
        assert!(matches!(PasswordHasher::new(32), Err(DomainError::Validation(_))));
        assert_eq!(PasswordHasher::new(12).unwrap().cost(), 12);
        assert_eq!(PasswordHasher::default().cost(), DEFAULT_COST);
    }

    #[tokio::test]
    async fn test_fresh_salt_per_hash() {
        let hasher = PasswordHasher::fast();
        let a = hasher.hash("pw1").await.unwrap();
        let b = hasher.hash("pw1").await.unwrap();

        assert_ne!(a, b);
        assert!(!a.contains("pw1"));
        assert!(hasher.verify("pw1", &a).await.unwrap());
        assert!(hasher.verify("pw1", &b).await.unwrap());
        assert!(!hasher.verify("pw2", &a).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_mismatch() {
        let hasher = PasswordHasher::fast();
        assert!(!hasher.verify("pw1", "not-a-bcrypt-hash").await.unwrap());
    }
}
