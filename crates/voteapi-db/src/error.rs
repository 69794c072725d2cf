//! Error types for the data layer.
//!
//! All failures surface as [`DbError`]. The variants follow the four
//! outcome classes the store distinguishes:
//!
//! - **validation** -- [`DbError::Validation`], raised before any transaction
//! - **not found** -- [`DbError::NotFound`], a targeted or referenced row is
//!   absent; never retried
//! - **serialization conflict** -- a [`DbError::Postgres`] carrying SQLSTATE
//!   `40001`; retried inside the transaction executor and normally invisible
//! - **infrastructure** -- everything else

use voteapi_types::{EntityKind, ValidationError};

/// SQLSTATE reported by `PostgreSQL` when a serializable transaction lost a
/// conflict and must be re-run.
pub const SERIALIZATION_FAILURE: &str = "40001";

/// SQLSTATE for a foreign key violation.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client input was rejected before touching the database.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The targeted or referenced entity does not exist.
    #[error("no such {0}")]
    NotFound(EntityKind),

    /// The entity cannot be deleted while other rows still reference it.
    #[error("{0} is still referenced")]
    InUse(EntityKind),

    /// The schema could not be created, so no operation can run.
    #[error("database schema is not ready")]
    SchemaUnavailable,

    /// The configured retry ceiling was reached on serialization conflicts.
    #[error("transaction gave up after {attempts} conflicting attempts")]
    Overloaded {
        /// Number of attempts made, including the first.
        attempts: u32,
    },

    /// A result row did not have the column count its row shape declares.
    #[error("row shape mismatch: expected {expected} columns, got {actual}")]
    Shape {
        /// Columns declared by the row shape.
        expected: usize,
        /// Columns present in the result row.
        actual: usize,
    },
}

impl DbError {
    /// Whether this is a serialization conflict that warrants re-running
    /// the whole transaction.
    pub fn is_serialization_failure(&self) -> bool {
        self.has_sqlstate(SERIALIZATION_FAILURE)
    }

    /// Whether this error reports a missing entity.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Turn a foreign key violation into [`DbError::InUse`] for `kind`,
    /// leaving every other error untouched.
    #[must_use]
    pub fn referenced_as(self, kind: EntityKind) -> Self {
        if self.has_sqlstate(FOREIGN_KEY_VIOLATION) {
            Self::InUse(kind)
        } else {
            self
        }
    }

    fn has_sqlstate(&self, code: &str) -> bool {
        match self {
            Self::Postgres(sqlx::Error::Database(db_err)) => {
                db_err.code().is_some_and(|c| c == code)
            }
            _ => false,
        }
    }
}
