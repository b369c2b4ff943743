//! Account search predicate
//!
//! Every search path (SQL-backed store, in-memory store, already-loaded
//! lists) decides membership with [`matches`], so results never depend on
//! where the filtering physically happens.

use super::Account;

/// Case-insensitive substring match on username or email.
pub fn matches(account: &Account, term: &str) -> bool {
    let term = term.to_lowercase();
    account.username.to_lowercase().contains(&term) || account.email.to_lowercase().contains(&term)
}

/// Treat an empty search term the same as no term at all.
pub fn normalize_term(term: Option<&str>) -> Option<&str> {
    term.filter(|t| !t.is_empty())
}

/// Retain the accounts matching `term`, preserving order.
pub fn filter_accounts(accounts: Vec<Account>, term: &str) -> Vec<Account> {
    accounts.into_iter().filter(|a| matches(a, term)).collect()
}
