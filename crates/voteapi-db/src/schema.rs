//! Lazy, once-per-store schema creation.
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS` the first time any
//! operation needs them. After a successful bootstrap the check is a single
//! atomic load on the store's [`OnceCell`](tokio::sync::OnceCell). Concurrent
//! first callers queue behind the one that performs the creation. A failed
//! bootstrap is not remembered; the next caller starts over.
//!
//! Separate stores and separate processes are serialized by a
//! transaction-scoped advisory lock taken before any DDL, since concurrent
//! `CREATE TABLE IF NOT EXISTS` on the same name can still collide in the
//! catalog.

use crate::error::DbError;
use crate::store::Store;

/// Advisory lock key held while the schema is created (`"voteapi\0"`).
pub const SCHEMA_LOCK_KEY: i64 = 0x766f_7465_6170_6900;

/// Taken first in the bootstrap transaction, released at commit or rollback.
const SCHEMA_LOCK: &str = "SELECT pg_advisory_xact_lock($1)";

/// DDL executed, in order, inside one read-write transaction.
///
/// Parents precede children so foreign keys resolve.
pub const SCHEMA: &[&str] = &[
    r"CREATE TABLE IF NOT EXISTS state (
        int_id  SMALLSERIAL PRIMARY KEY,
        ext_id  UUID NOT NULL UNIQUE,
        ru_name VARCHAR(255) NOT NULL
    )",
    r"CREATE TABLE IF NOT EXISTS office (
        int_id  SERIAL PRIMARY KEY,
        ext_id  UUID NOT NULL UNIQUE,
        state   SMALLINT NOT NULL REFERENCES state(int_id),
        ru_name VARCHAR(255) NOT NULL
    )",
    r"CREATE TABLE IF NOT EXISTS district (
        int_id  SMALLSERIAL PRIMARY KEY,
        ext_id  UUID NOT NULL UNIQUE,
        ru_name VARCHAR(255) NOT NULL
    )",
    r"CREATE TABLE IF NOT EXISTS station (
        ext_id   UUID PRIMARY KEY,
        office   INTEGER NOT NULL REFERENCES office(int_id),
        district SMALLINT NOT NULL REFERENCES district(int_id),
        ru_name  VARCHAR(255) NOT NULL
    )",
    r"CREATE INDEX IF NOT EXISTS office_state_idx ON office (state)",
    r"CREATE INDEX IF NOT EXISTS station_office_idx ON station (office)",
];

impl Store {
    /// Make sure all tables exist, creating them on first use.
    ///
    /// Returns `false` when creation failed (connectivity, permissions); the
    /// failure is logged and the next call tries again.
    pub async fn ensure_schema(&self) -> bool {
        match self
            .schema_cell()
            .get_or_try_init(|| self.import_schema())
            .await
        {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(error = %err, "Couldn't create database schema");
                false
            }
        }
    }

    /// Whether a bootstrap has already succeeded on this store.
    pub fn schema_ready(&self) -> bool {
        self.schema_cell().initialized()
    }

    /// [`Store::ensure_schema`] as a `Result`, for operations that cannot
    /// proceed without tables.
    pub(crate) async fn require_schema(&self) -> Result<(), DbError> {
        if self.ensure_schema().await {
            Ok(())
        } else {
            Err(DbError::SchemaUnavailable)
        }
    }

    async fn import_schema(&self) -> Result<(), DbError> {
        self.run_transaction(false, |conn| {
            Box::pin(async move {
                sqlx::query(SCHEMA_LOCK)
                    .bind(SCHEMA_LOCK_KEY)
                    .execute(&mut *conn)
                    .await?;
                for statement in SCHEMA {
                    sqlx::query(statement).execute(&mut *conn).await?;
                }
                Ok::<_, DbError>(())
            })
        })
        .await?;

        tracing::info!(tables = 4, "Database schema ready");
        Ok(())
    }
}
