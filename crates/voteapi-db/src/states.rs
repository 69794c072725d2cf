//! Operations on the `state` table.
//!
//! States are the roots of the hierarchy. They have no parent to check, so
//! every write is a single statement inside a serializable transaction.
//! Rename and delete learn whether the target existed from the affected row
//! count alone; there is no separate existence probe to race with.

use std::collections::BTreeMap;

use voteapi_types::{EntityKind, Name, StateId};

use crate::error::DbError;
use crate::rows::{NamedRow, fetch_all, select_list};
use crate::store::{Store, found};

/// Operations on states.
pub struct StateStore<'a> {
    store: &'a Store,
}

impl<'a> StateStore<'a> {
    /// Bind to a store.
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create a state and return its new external id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::SchemaUnavailable`] or [`DbError::Postgres`].
    pub async fn create(&self, name: &Name) -> Result<StateId, DbError> {
        self.store.require_schema().await?;

        let id = StateId::new();
        let name = name.as_str().to_owned();

        self.store
            .run_transaction(false, move |conn| {
                let name = name.clone();
                Box::pin(async move {
                    sqlx::query("INSERT INTO state (ext_id, ru_name) VALUES ($1, $2)")
                        .bind(id.into_inner())
                        .bind(name)
                        .execute(conn)
                        .await?;
                    Ok::<_, DbError>(())
                })
            })
            .await?;

        tracing::debug!(state = %id, "Created state");
        Ok(id)
    }

    /// All states by external id.
    ///
    /// A plain read on the pool; a single statement needs no transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::SchemaUnavailable`] or [`DbError::Postgres`].
    pub async fn list(&self) -> Result<BTreeMap<StateId, String>, DbError> {
        self.store.require_schema().await?;

        let sql = format!("SELECT {} FROM state", select_list::<NamedRow>());
        let rows: Vec<NamedRow> = fetch_all(self.store.pool(), sqlx::query(&sql)).await?;

        Ok(rows
            .into_iter()
            .map(|row| (StateId::from(row.ext_id), row.ru_name))
            .collect())
    }

    /// Rename a state.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no state has this id.
    pub async fn rename(&self, id: StateId, name: &Name) -> Result<(), DbError> {
        self.store.require_schema().await?;

        let name = name.as_str().to_owned();

        self.store
            .run_transaction(false, move |conn| {
                let name = name.clone();
                Box::pin(async move {
                    let result = sqlx::query("UPDATE state SET ru_name = $1 WHERE ext_id = $2")
                        .bind(name)
                        .bind(id.into_inner())
                        .execute(conn)
                        .await?;
                    found(result.rows_affected(), EntityKind::State)
                })
            })
            .await
    }

    /// Delete a state.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no state has this id and
    /// [`DbError::InUse`] while offices still belong to it.
    pub async fn delete(&self, id: StateId) -> Result<(), DbError> {
        self.store.require_schema().await?;

        self.store
            .run_transaction(false, move |conn| {
                Box::pin(async move {
                    let result = sqlx::query("DELETE FROM state WHERE ext_id = $1")
                        .bind(id.into_inner())
                        .execute(conn)
                        .await?;
                    found(result.rows_affected(), EntityKind::State)
                })
            })
            .await
            .map_err(|e| e.referenced_as(EntityKind::State))?;

        tracing::debug!(state = %id, "Deleted state");
        Ok(())
    }
}
