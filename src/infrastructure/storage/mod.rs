//! Non-database account stores

mod memory;

pub use memory::InMemoryAccountStore;
