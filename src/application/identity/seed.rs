//! Random sample accounts for development databases.

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

use super::AccountService;
use crate::domain::{AccountProfile, AccountStore, DomainError, DomainResult};

/// Generated sign-up input. The plaintext password is returned to the
/// caller so seeded accounts can be exercised afterwards.
#[derive(Clone)]
pub struct SeedAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

fn random_token(rng: &mut impl Rng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Build `count` random sign-up inputs.
pub fn random_accounts(count: usize) -> Vec<SeedAccount> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let handle = random_token(&mut rng, 8).to_lowercase();
            SeedAccount {
                username: format!("user_{}", handle),
                email: format!("{}@example.com", handle),
                password: random_token(&mut rng, 16),
            }
        })
        .collect()
}

impl<S: AccountStore + ?Sized> AccountService<S> {
    /// Create `count` random accounts through the regular sign-up path.
    ///
    /// A generated name that collides with an existing account is skipped,
    /// so fewer than `count` accounts may come back.
    pub async fn seed(&self, count: usize) -> DomainResult<Vec<(AccountProfile, SeedAccount)>> {
        let mut created = Vec::with_capacity(count);
        for input in random_accounts(count) {
            match self
                .create(&input.username, &input.email, &input.password)
                .await
            {
                Ok(profile) => created.push((profile, input)),
                Err(DomainError::Conflict(_)) => {
                    warn!(username = %input.username, "Seed account collided, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        info!(requested = count, created = created.len(), "Seeded accounts");
        Ok(created)
    }
}
