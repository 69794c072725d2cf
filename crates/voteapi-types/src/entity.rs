//! The four entity kinds of the dataset.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which kind of entity an outcome refers to.
///
/// Used to say *what* was missing ("no such district") or still referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EntityKind {
    /// A state.
    State,
    /// An office within a state.
    Office,
    /// An electoral district.
    District,
    /// A polling station.
    Station,
}

impl EntityKind {
    /// Lowercase noun used in client-facing messages and table names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Office => "office",
            Self::District => "district",
            Self::Station => "station",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase_noun() {
        assert_eq!(format!("no such {}", EntityKind::District), "no such district");
        assert_eq!(EntityKind::Station.as_str(), "station");
    }
}
