//! Outbound adapters implementing domain ports for storage.
//!
//! - **memory**: in-process store for tests and database-less runs
//! - **persistence**: PostgreSQL-backed store using Diesel ORM
//!
//! Adapters translate between domain types and storage representations.
//! They contain no business logic.

pub mod memory;
pub mod persistence;
