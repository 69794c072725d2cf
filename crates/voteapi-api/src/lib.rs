//! HTTP API for the `VoteAPI` reference dataset.
//!
//! This crate provides an Axum server over [`voteapi_db::Store`]:
//!
//! - **Public reads** -- `GET` lists of states, offices per state,
//!   districts, and stations per office
//! - **Admin writes** -- `PUT` (create), `POST` (rename/update), and
//!   `DELETE`, gated by HTTP basic auth
//!
//! # Architecture
//!
//! ```text
//! request --> TraceLayer --> CORS --> admin gate --> handler --> Store
//!                                    (writes only)     |
//!                                                 ApiError --> {"error": ...}
//! ```
//!
//! Handlers validate ids and bodies, call exactly one store operation, and
//! map its outcome onto a status code. All transactional behavior lives in
//! the data layer.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use auth::AdminCredentials;
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
