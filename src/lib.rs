//! Karya: collaborative study-task tracking core.
//!
//! This crate provides the domain core of a buddy-based task tracker:
//! users connect as buddies, assign each other study tasks, and earn
//! experience points (XP) with derived levels and titles. The crate owns
//! the invariant-bearing logic only; HTTP transport, credentials, and the
//! backing document store are external collaborators reached through
//! ports.
//!
//! # Architecture
//!
//! Karya follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the backing store
//! - **Adapters**: Concrete port implementations (in-memory store)
//! - **Services**: Orchestration of domain operations as atomic units
//!
//! # Modules
//!
//! - [`domain`]: Aggregates, the XP progression engine, and status enums
//! - [`ports`]: Store contracts with atomic multi-document commits
//! - [`adapters`]: In-memory store implementation
//! - [`services`]: Task, buddy, and user orchestration services

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
