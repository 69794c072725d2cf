//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity carries an external UUID, the only identifier clients ever
//! see. Internal integer ids stay inside the data layer. Wrapping each kind
//! in its own newtype keeps a station id from being passed where a district
//! id is expected.
//!
//! External ids are random (UUID v4) and generated by the application, once
//! per logical create.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier (UUID v4).
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }

            /// Whether this is the all-zero UUID, which never names an entity.
            pub const fn is_nil(self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// External identifier of a state (top-level region).
    StateId
}

define_id! {
    /// External identifier of an electoral office belonging to a state.
    OfficeId
}

define_id! {
    /// External identifier of an electoral district.
    DistrictId
}

define_id! {
    /// External identifier of a polling station.
    StationId
}
