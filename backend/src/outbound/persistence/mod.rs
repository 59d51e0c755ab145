//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! [`DieselReviewStore`] implements the review store port over PostgreSQL
//! via `diesel-async` with `bb8` connection pooling. One pooled connection
//! carries each transaction; every entity sub-store of that transaction is
//! implemented directly on it.
//!
//! Diesel row structs (`models.rs`) and schema definitions (`schema.rs`)
//! are internal and never reach the domain layer. Database errors are mapped
//! to [`StoreError`](crate::domain::ports::StoreError) before leaving the
//! adapter.
//!
//! # Example
//!
//! ```ignore
//! use reviewer_service::outbound::persistence::{DbPool, DieselReviewStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/reviews")).await?;
//! let store = DieselReviewStore::new(pool);
//! ```

mod diesel_pull_request_queries;
mod diesel_review_mapping;
mod diesel_review_store;
mod diesel_stats_queries;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_review_store::{DieselReviewStore, DieselTransaction};
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DEFAULT_MAX_SIZE, DEFAULT_MIN_IDLE, DbPool, PoolConfig, PoolError};
