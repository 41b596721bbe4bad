//! Unit tests for the karya core.
//!
//! Tests are organised by concern: the pure progression engine, domain
//! aggregates, and the three orchestration services, covering happy
//! paths, error cases, and the invariants from the crate contract.

mod task_service_tests;
mod user_service_tests;
