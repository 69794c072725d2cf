//! Serializable transactions with transparent conflict retry.
//!
//! Every store operation that reads-then-writes runs its body through
//! [`Store::run_transaction`]. The body receives the transaction's
//! connection and may be invoked several times: once per attempt. It must
//! therefore be free of side effects outside the transaction. Values with
//! external meaning (new entity ids) are created by the caller before the
//! call and captured, so every attempt writes the same id.
//!
//! ```text
//! loop {
//!     BEGIN; SET TRANSACTION ISOLATION LEVEL SERIALIZABLE [, READ ONLY]
//!     body(conn)  --Err--> ROLLBACK --40001?--> retry / return
//!     COMMIT      --Err--> (rolled back) --40001?--> retry / return
//!     return Ok
//! }
//! ```

use futures::future::BoxFuture;
use sqlx::PgConnection;

use crate::error::DbError;
use crate::store::Store;

const BEGIN_READ_WRITE: &str = "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE, READ WRITE";
const BEGIN_READ_ONLY: &str = "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE, READ ONLY";

/// Statement that fixes the isolation level of a freshly begun transaction.
pub const fn isolation_statement(read_only: bool) -> &'static str {
    if read_only {
        BEGIN_READ_ONLY
    } else {
        BEGIN_READ_WRITE
    }
}

impl Store {
    /// Run `work` inside a serializable transaction and commit it.
    ///
    /// `read_only` marks the transaction `READ ONLY`, a hint that lets the
    /// server skip predicate bookkeeping; it is not needed for correctness.
    ///
    /// An error from `work` rolls the transaction back. An error from
    /// `work` or from `COMMIT` that is a serialization failure re-runs the
    /// whole attempt according to the store's [`RetryPolicy`]; any other
    /// error is returned as is.
    ///
    /// [`RetryPolicy`]: crate::retry::RetryPolicy
    ///
    /// # Errors
    ///
    /// Whatever `work` returns, [`DbError::Postgres`] for begin/commit
    /// failures, or [`DbError::Overloaded`] past a configured retry ceiling.
    pub async fn run_transaction<T, F>(&self, read_only: bool, mut work: F) -> Result<T, DbError>
    where
        F: for<'c> FnMut(&'c mut PgConnection) -> BoxFuture<'c, Result<T, DbError>>,
    {
        let policy = self.retry_policy();
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);

            let err = match self.attempt(read_only, &mut work).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let pause = policy.next_delay(err, attempt)?;
            self.record_conflict_retry();
            tracing::debug!(attempt, read_only, "Serialization conflict, retrying transaction");

            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
    }

    async fn attempt<T, F>(&self, read_only: bool, work: &mut F) -> Result<T, DbError>
    where
        F: for<'c> FnMut(&'c mut PgConnection) -> BoxFuture<'c, Result<T, DbError>>,
    {
        let mut tx = self.pool().begin().await?;
        sqlx::query(isolation_statement(read_only))
            .execute(&mut *tx)
            .await?;

        match work(&mut *tx).await {
            Ok(value) => {
                // A failed COMMIT leaves `tx` open; dropping it rolls back.
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}
