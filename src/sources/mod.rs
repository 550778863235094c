//! Implementations of the list data source traits.

/// SeaORM-backed source standing in for the platform backend
pub mod db;
/// In-memory source for fixtures and tests
pub mod memory;

pub use db::DbSource;
pub use memory::InMemorySource;
