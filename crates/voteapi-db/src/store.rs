//! The store handle shared by every request.
//!
//! A [`Store`] owns the connection pool, the retry policy, and its own
//! schema-initialized cell. It is built once at startup and cloned into
//! each handler; clones share all three. Separate `Store`s (e.g. in tests)
//! bootstrap independently.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sqlx::PgPool;
use tokio::sync::OnceCell;
use voteapi_types::EntityKind;

use crate::districts::DistrictStore;
use crate::error::DbError;
use crate::offices::OfficeStore;
use crate::postgres::PostgresPool;
use crate::retry::RetryPolicy;
use crate::stations::StationStore;
use crate::states::StateStore;

/// Cheaply clonable handle to the reference dataset.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    pool: PostgresPool,
    retry: RetryPolicy,
    schema: OnceCell<()>,
    conflict_retries: AtomicU64,
}

impl Store {
    /// Wrap a pool. The schema is created lazily on first use.
    pub fn new(pool: PostgresPool, retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                pool,
                retry,
                schema: OnceCell::new(),
                conflict_retries: AtomicU64::new(0),
            }),
        }
    }

    /// Operations on states.
    pub const fn states(&self) -> StateStore<'_> {
        StateStore::new(self)
    }

    /// Operations on offices.
    pub const fn offices(&self) -> OfficeStore<'_> {
        OfficeStore::new(self)
    }

    /// Operations on districts.
    pub const fn districts(&self) -> DistrictStore<'_> {
        DistrictStore::new(self)
    }

    /// Operations on polling stations.
    pub const fn stations(&self) -> StationStore<'_> {
        StationStore::new(self)
    }

    /// The underlying [`PgPool`].
    pub fn pool(&self) -> &PgPool {
        self.inner.pool.pool()
    }

    /// The retry policy applied to serialization conflicts.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    /// How many times any transaction on this store was re-run after a
    /// serialization conflict.
    pub fn conflict_retries(&self) -> u64 {
        self.inner.conflict_retries.load(Ordering::Relaxed)
    }

    /// Close the pool. Outstanding clones become unusable.
    pub async fn close(&self) {
        self.inner.pool.close().await;
    }

    pub(crate) fn schema_cell(&self) -> &OnceCell<()> {
        &self.inner.schema
    }

    pub(crate) fn record_conflict_retry(&self) {
        self.inner.conflict_retries.fetch_add(1, Ordering::Relaxed);
    }
}

impl core::fmt::Debug for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Store")
            .field("retry", &self.inner.retry)
            .field("schema_ready", &self.inner.schema.initialized())
            .finish_non_exhaustive()
    }
}

/// Zero affected rows means the target does not exist.
pub(crate) const fn found(rows_affected: u64, kind: EntityKind) -> Result<(), DbError> {
    if rows_affected > 0 {
        Ok(())
    } else {
        Err(DbError::NotFound(kind))
    }
}
