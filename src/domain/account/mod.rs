//! Account aggregate
//!
//! Contains the Account entity, the public projection, the shared search
//! predicate, and the storage interface.

pub mod filter;
pub mod model;
pub mod repository;

mod dto_create;

pub use model::{Account, AccountProfile, AccountSummary};

pub use dto_create::CreateAccountDto;

pub use filter::{filter_accounts, matches, normalize_term};

pub use repository::AccountStore;
