//! Identity module — account management & credential verification
//!
//! Contains the `AccountService` which orchestrates all account
//! use-cases: sign-up, search, rename, delete, seeding.

pub mod seed;
pub mod service;

pub use seed::{random_accounts, SeedAccount};
pub use service::{AccountService, DUPLICATE_ACCOUNT_MESSAGE, INCORRECT_PASSWORD_MESSAGE};
