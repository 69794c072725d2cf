//! Mapping query results onto fixed-shape records.
//!
//! Every query the store issues goes through [`fetch_all`]. A result type
//! implements [`RowShape`], which pairs the SELECT expressions with the
//! positional scan that reads them back:
//!
//! ```text
//! RowShape::COLUMNS  ["s.ext_id", "d.ext_id", "s.ru_name"]
//!        |                 |            |           |
//!  select_list()    "SELECT s.ext_id, d.ext_id, s.ru_name FROM ..."
//!        |                 |            |           |
//!  from_row(row)      try_get(0)   try_get(1)  try_get(2)
//! ```
//!
//! Because the SQL select list is rendered from the same table the scan
//! follows, column order and field order cannot drift apart. Each row's
//! column count is still checked against the shape before it is scanned.
//!
//! The executor may be the bare pool (reads outside a transaction) or a
//! connection inside an open transaction; both implement
//! [`sqlx::Executor`].

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Executor, Postgres, Row};
use uuid::Uuid;

use crate::error::DbError;

/// A record type with a fixed, ordered list of selected columns.
pub trait RowShape: Sized {
    /// SELECT expressions in scan order.
    const COLUMNS: &'static [&'static str];

    /// Read one record from a row, positionally in [`Self::COLUMNS`] order.
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

/// Render the SELECT list for a shape, e.g. `ext_id, ru_name`.
pub fn select_list<R: RowShape>() -> String {
    R::COLUMNS.join(", ")
}

/// Run `query` and map every result row onto `R`, in row order.
///
/// Zero matching rows yield an empty vector.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] on query or decode failure and
/// [`DbError::Shape`] when a row's column count differs from the shape.
pub async fn fetch_all<'q, 'e, 'c: 'e, R, E>(
    executor: E,
    query: Query<'q, Postgres, PgArguments>,
) -> Result<Vec<R>, DbError>
where
    R: RowShape,
    E: 'e + Executor<'c, Database = Postgres>,
    'q: 'e,
{
    let rows = query.fetch_all(executor).await?;
    rows.iter().map(scan::<R>).collect()
}

/// Like [`fetch_all`] but keep only the first record, if any.
///
/// # Errors
///
/// Same as [`fetch_all`].
pub async fn fetch_first<'q, 'e, 'c: 'e, R, E>(
    executor: E,
    query: Query<'q, Postgres, PgArguments>,
) -> Result<Option<R>, DbError>
where
    R: RowShape,
    E: 'e + Executor<'c, Database = Postgres>,
    'q: 'e,
{
    Ok(fetch_all::<R, E>(executor, query).await?.into_iter().next())
}

fn scan<R: RowShape>(row: &PgRow) -> Result<R, DbError> {
    check_arity(R::COLUMNS.len(), row.len())?;
    Ok(R::from_row(row)?)
}

/// Compare a shape's declared column count with what the row carries.
pub const fn check_arity(expected: usize, actual: usize) -> Result<(), DbError> {
    if expected == actual {
        Ok(())
    } else {
        Err(DbError::Shape { expected, actual })
    }
}

// =========================================================================
// Shapes used by the entity store
// =========================================================================

/// Internal id of a `SMALLSERIAL` table (`state`, `district`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmallIdRow {
    /// Internal id.
    pub int_id: i16,
}

impl RowShape for SmallIdRow {
    const COLUMNS: &'static [&'static str] = &["int_id"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            int_id: row.try_get(0)?,
        })
    }
}

/// Internal id of a `SERIAL` table (`office`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRow {
    /// Internal id.
    pub int_id: i32,
}

impl RowShape for IdRow {
    const COLUMNS: &'static [&'static str] = &["int_id"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            int_id: row.try_get(0)?,
        })
    }
}

/// External id plus display name, the listing shape of every plain entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRow {
    /// External id.
    pub ext_id: Uuid,
    /// Display name.
    pub ru_name: String,
}

impl RowShape for NamedRow {
    const COLUMNS: &'static [&'static str] = &["ext_id", "ru_name"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            ext_id: row.try_get(0)?,
            ru_name: row.try_get(1)?,
        })
    }
}

/// A station joined with its district (`station s`, `district d`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRow {
    /// External id of the station.
    pub ext_id: Uuid,
    /// External id of the station's district.
    pub district: Uuid,
    /// Display name.
    pub ru_name: String,
}

impl RowShape for StationRow {
    const COLUMNS: &'static [&'static str] = &["s.ext_id", "d.ext_id", "s.ru_name"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            ext_id: row.try_get(0)?,
            district: row.try_get(1)?,
            ru_name: row.try_get(2)?,
        })
    }
}
