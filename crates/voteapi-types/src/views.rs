//! JSON shapes handed back to clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::ids::DistrictId;

/// Body of a `201 Created` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Created {
    /// External id of the new entity.
    pub id: Uuid,
}

/// Visible attributes of a polling station in an office listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StationView {
    /// District the station belongs to.
    pub district: DistrictId,
    /// Display name.
    pub ru_name: String,
}
