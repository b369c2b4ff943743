//! Database entities module

pub mod account;
