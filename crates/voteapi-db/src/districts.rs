//! Operations on the `district` table.
//!
//! Districts stand outside the state/office tree; stations reference them
//! alongside their office.

use std::collections::BTreeMap;

use voteapi_types::{DistrictId, EntityKind, Name};

use crate::error::DbError;
use crate::rows::{NamedRow, fetch_all, select_list};
use crate::store::{Store, found};

/// Operations on districts.
pub struct DistrictStore<'a> {
    store: &'a Store,
}

impl<'a> DistrictStore<'a> {
    /// Bind to a store.
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create a district and return its new external id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::SchemaUnavailable`] or [`DbError::Postgres`].
    pub async fn create(&self, name: &Name) -> Result<DistrictId, DbError> {
        self.store.require_schema().await?;

        let id = DistrictId::new();
        let name = name.as_str().to_owned();

        self.store
            .run_transaction(false, move |conn| {
                let name = name.clone();
                Box::pin(async move {
                    sqlx::query("INSERT INTO district (ext_id, ru_name) VALUES ($1, $2)")
                        .bind(id.into_inner())
                        .bind(name)
                        .execute(conn)
                        .await?;
                    Ok::<_, DbError>(())
                })
            })
            .await?;

        tracing::debug!(district = %id, "Created district");
        Ok(id)
    }

    /// All districts by external id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::SchemaUnavailable`] or [`DbError::Postgres`].
    pub async fn list(&self) -> Result<BTreeMap<DistrictId, String>, DbError> {
        self.store.require_schema().await?;

        let sql = format!("SELECT {} FROM district", select_list::<NamedRow>());
        let rows: Vec<NamedRow> = fetch_all(self.store.pool(), sqlx::query(&sql)).await?;

        Ok(rows
            .into_iter()
            .map(|row| (DistrictId::from(row.ext_id), row.ru_name))
            .collect())
    }

    /// Rename a district.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no district has this id.
    pub async fn rename(&self, id: DistrictId, name: &Name) -> Result<(), DbError> {
        self.store.require_schema().await?;

        let name = name.as_str().to_owned();

        self.store
            .run_transaction(false, move |conn| {
                let name = name.clone();
                Box::pin(async move {
                    let result = sqlx::query("UPDATE district SET ru_name = $1 WHERE ext_id = $2")
                        .bind(name)
                        .bind(id.into_inner())
                        .execute(conn)
                        .await?;
                    found(result.rows_affected(), EntityKind::District)
                })
            })
            .await
    }

    /// Delete a district.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no district has this id and
    /// [`DbError::InUse`] while stations still point at it.
    pub async fn delete(&self, id: DistrictId) -> Result<(), DbError> {
        self.store.require_schema().await?;

        self.store
            .run_transaction(false, move |conn| {
                Box::pin(async move {
                    let result = sqlx::query("DELETE FROM district WHERE ext_id = $1")
                        .bind(id.into_inner())
                        .execute(conn)
                        .await?;
                    found(result.rows_affected(), EntityKind::District)
                })
            })
            .await
            .map_err(|e| e.referenced_as(EntityKind::District))?;

        tracing::debug!(district = %id, "Deleted district");
        Ok(())
    }
}
