//! Port contracts for the backing document store.
//!
//! Ports define infrastructure-agnostic interfaces used by the services.
//! Any store offering atomic multi-document commits can satisfy them.

pub mod store;

pub use store::{BuddyRequestStore, StoreError, StoreResult, TaskStore, UserStore};
