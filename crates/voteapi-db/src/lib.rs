//! Transactional data layer for the `VoteAPI` reference dataset.
//!
//! The dataset is a small hierarchy kept in `PostgreSQL`:
//!
//! ```text
//! state ──< office ──< station >── district
//! ```
//!
//! Every read-then-write runs in a `SERIALIZABLE` transaction that is
//! re-run automatically when the server reports a serialization conflict,
//! so concurrent requests never observe or produce a half-applied change.
//! Tables are created on first use.
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool and configuration
//! - [`store`] -- the shared [`Store`] handle
//! - [`transaction`] -- serializable execution with conflict retry
//! - [`retry`] -- the retry policy
//! - [`schema`] -- lazy table creation
//! - [`rows`] -- fixed-shape result mapping
//! - [`states`], [`offices`], [`districts`], [`stations`] -- entity operations
//! - [`error`] -- shared error type

pub mod districts;
pub mod error;
pub mod offices;
pub mod postgres;
pub mod retry;
pub mod rows;
pub mod schema;
pub mod states;
pub mod stations;
pub mod store;
pub mod transaction;

// Re-export primary types for convenience.
pub use districts::DistrictStore;
pub use error::DbError;
pub use offices::OfficeStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use retry::RetryPolicy;
pub use states::StateStore;
pub use stations::StationStore;
pub use store::Store;
