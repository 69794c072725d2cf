//! Shared type definitions for the `VoteAPI` reference dataset.
//!
//! The dataset is a small hierarchy: states own offices, offices own polling
//! stations, and every station also points at an electoral district. This
//! crate holds the identifiers and values that both the data layer and the
//! HTTP surface speak. Response types flow to `TypeScript` via `ts-rs` for the
//! browser and mobile frontends.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for the external entity identifiers
//! - [`name`] -- Validated display names and input validation errors
//! - [`entity`] -- Entity kinds used in "no such ..." outcomes
//! - [`views`] -- JSON shapes returned by list and create operations

pub mod entity;
pub mod ids;
pub mod name;
pub mod views;

// Re-export all public types at crate root for convenience.
pub use entity::EntityKind;
pub use ids::{DistrictId, OfficeId, StateId, StationId};
pub use name::{MAX_NAME_CHARS, Name, ValidationError};
pub use views::{Created, StationView};
