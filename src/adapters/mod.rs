//! Adapter implementations of the store ports.

pub mod memory;

pub use memory::InMemoryStore;
