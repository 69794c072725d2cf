//! Validated display names.
//!
//! Every entity needs a non-empty display name. Validation happens when a
//! [`Name`] is constructed, so no store operation can be handed an invalid
//! one and no transaction is ever opened for it.

/// Longest name the `ru_name VARCHAR(255)` columns accept, in characters.
pub const MAX_NAME_CHARS: usize = 255;

/// Client input rejected before any database work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The name was empty or whitespace only.
    #[error(".ru_name missing")]
    EmptyName,

    /// The name does not fit the storage column.
    #[error(".ru_name longer than {max} characters")]
    NameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The name contains a NUL character, which `PostgreSQL` text cannot hold.
    #[error(".ru_name contains a NUL character")]
    NulInName,

    /// A station payload did not name its district.
    #[error(".district missing")]
    MissingDistrict,
}

/// A display name that is known to be non-blank, free of NUL characters,
/// and short enough to store.
///
/// The text is kept exactly as supplied; only blank-ness is judged on the
/// trimmed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    /// Validate a raw name.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if raw.chars().count() > MAX_NAME_CHARS {
            return Err(ValidationError::NameTooLong {
                max: MAX_NAME_CHARS,
            });
        }
        if raw.contains('\0') {
            return Err(ValidationError::NulInName);
        }
        Ok(Self(raw))
    }

    /// Borrow the name text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Name {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
