//! Operations on the `office` table.
//!
//! An office belongs to exactly one state. Creating an office looks the
//! state up and inserts the office in the same serializable transaction;
//! if the state is gone the transaction aborts without writing and the
//! caller gets [`DbError::NotFound`] for the state. A state deleted
//! concurrently either is seen as absent or forces one of the two
//! transactions to retry, so no office ever commits against a deleted
//! state.

use std::collections::BTreeMap;

use voteapi_types::{EntityKind, Name, OfficeId, StateId};

use crate::error::DbError;
use crate::rows::{NamedRow, SmallIdRow, fetch_all, fetch_first, select_list};
use crate::store::{Store, found};

/// Operations on offices.
pub struct OfficeStore<'a> {
    store: &'a Store,
}

impl<'a> OfficeStore<'a> {
    /// Bind to a store.
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create an office under `state` and return its new external id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for [`EntityKind::State`] if the state
    /// does not exist.
    pub async fn create(&self, state: StateId, name: &Name) -> Result<OfficeId, DbError> {
        self.store.require_schema().await?;

        let id = OfficeId::new();
        let name = name.as_str().to_owned();
        let lookup = state_lookup_sql();

        self.store
            .run_transaction(false, move |conn| {
                let name = name.clone();
                let lookup = lookup.clone();
                Box::pin(async move {
                    let parent: Option<SmallIdRow> =
                        fetch_first(&mut *conn, sqlx::query(&lookup).bind(state.into_inner()))
                            .await?;
                    let Some(parent) = parent else {
                        return Err(DbError::NotFound(EntityKind::State));
                    };

                    sqlx::query("INSERT INTO office (ext_id, state, ru_name) VALUES ($1, $2, $3)")
                        .bind(id.into_inner())
                        .bind(parent.int_id)
                        .bind(name)
                        .execute(&mut *conn)
                        .await?;
                    Ok::<_, DbError>(())
                })
            })
            .await?;

        tracing::debug!(office = %id, state = %state, "Created office");
        Ok(id)
    }

    /// Offices of one state, by external id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for [`EntityKind::State`] if the state
    /// does not exist.
    pub async fn list_for_state(
        &self,
        state: StateId,
    ) -> Result<BTreeMap<OfficeId, String>, DbError> {
        self.store.require_schema().await?;

        let lookup = state_lookup_sql();
        let children = format!(
            "SELECT {} FROM office WHERE state = $1",
            select_list::<NamedRow>()
        );

        let rows = self
            .store
            .run_transaction(true, move |conn| {
                let lookup = lookup.clone();
                let children = children.clone();
                Box::pin(async move {
                    let parent: Option<SmallIdRow> =
                        fetch_first(&mut *conn, sqlx::query(&lookup).bind(state.into_inner()))
                            .await?;
                    let Some(parent) = parent else {
                        return Err(DbError::NotFound(EntityKind::State));
                    };

                    let rows: Vec<NamedRow> =
                        fetch_all(&mut *conn, sqlx::query(&children).bind(parent.int_id)).await?;
                    Ok::<_, DbError>(rows)
                })
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (OfficeId::from(row.ext_id), row.ru_name))
            .collect())
    }

    /// Rename an office.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no office has this id.
    pub async fn rename(&self, id: OfficeId, name: &Name) -> Result<(), DbError> {
        self.store.require_schema().await?;

        let name = name.as_str().to_owned();

        self.store
            .run_transaction(false, move |conn| {
                let name = name.clone();
                Box::pin(async move {
                    let result = sqlx::query("UPDATE office SET ru_name = $1 WHERE ext_id = $2")
                        .bind(name)
                        .bind(id.into_inner())
                        .execute(conn)
                        .await?;
                    found(result.rows_affected(), EntityKind::Office)
                })
            })
            .await
    }

    /// Delete an office.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no office has this id and
    /// [`DbError::InUse`] while stations still belong to it.
    pub async fn delete(&self, id: OfficeId) -> Result<(), DbError> {
        self.store.require_schema().await?;

        self.store
            .run_transaction(false, move |conn| {
                Box::pin(async move {
                    let result = sqlx::query("DELETE FROM office WHERE ext_id = $1")
                        .bind(id.into_inner())
                        .execute(conn)
                        .await?;
                    found(result.rows_affected(), EntityKind::Office)
                })
            })
            .await
            .map_err(|e| e.referenced_as(EntityKind::Office))?;

        tracing::debug!(office = %id, "Deleted office");
        Ok(())
    }
}

fn state_lookup_sql() -> String {
    format!(
        "SELECT {} FROM state WHERE ext_id = $1",
        select_list::<SmallIdRow>()
    )
}
