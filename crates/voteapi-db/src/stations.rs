//! Operations on the `station` table.
//!
//! A station references two parents: the office it belongs to and the
//! district it is assigned to. Both are resolved from their external ids
//! inside the same serializable transaction as the write, office first,
//! so the first missing parent is the one reported.

use std::collections::BTreeMap;

use voteapi_types::{
    DistrictId, EntityKind, Name, OfficeId, StationId, StationView, ValidationError,
};

use crate::error::DbError;
use crate::rows::{IdRow, SmallIdRow, StationRow, fetch_all, fetch_first, select_list};
use crate::store::{Store, found};

/// Operations on polling stations.
pub struct StationStore<'a> {
    store: &'a Store,
}

impl<'a> StationStore<'a> {
    /// Bind to a store.
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create a station in `office`, assigned to `district`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Validation`] for a nil district id, and
    /// [`DbError::NotFound`] naming the office or, if the office exists,
    /// the district when either is missing.
    pub async fn create(
        &self,
        office: OfficeId,
        district: DistrictId,
        name: &Name,
    ) -> Result<StationId, DbError> {
        require_district(district)?;
        self.store.require_schema().await?;

        let id = StationId::new();
        let name = name.as_str().to_owned();
        let office_sql = office_lookup_sql();
        let district_sql = district_lookup_sql();

        self.store
            .run_transaction(false, move |conn| {
                let name = name.clone();
                let office_sql = office_sql.clone();
                let district_sql = district_sql.clone();
                Box::pin(async move {
                    let parent: Option<IdRow> =
                        fetch_first(&mut *conn, sqlx::query(&office_sql).bind(office.into_inner()))
                            .await?;
                    let Some(parent) = parent else {
                        return Err(DbError::NotFound(EntityKind::Office));
                    };

                    let assigned: Option<SmallIdRow> = fetch_first(
                        &mut *conn,
                        sqlx::query(&district_sql).bind(district.into_inner()),
                    )
                    .await?;
                    let Some(assigned) = assigned else {
                        return Err(DbError::NotFound(EntityKind::District));
                    };

                    sqlx::query(
                        "INSERT INTO station (ext_id, office, district, ru_name) \
                         VALUES ($1, $2, $3, $4)",
                    )
                    .bind(id.into_inner())
                    .bind(parent.int_id)
                    .bind(assigned.int_id)
                    .bind(name)
                    .execute(&mut *conn)
                    .await?;
                    Ok::<_, DbError>(())
                })
            })
            .await?;

        tracing::debug!(station = %id, office = %office, district = %district, "Created station");
        Ok(id)
    }

    /// Stations of one office with their district assignment.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for [`EntityKind::Office`] if the
    /// office does not exist.
    pub async fn list_for_office(
        &self,
        office: OfficeId,
    ) -> Result<BTreeMap<StationId, StationView>, DbError> {
        self.store.require_schema().await?;

        let lookup = office_lookup_sql();
        let children = format!(
            "SELECT {} FROM station s \
             INNER JOIN district d ON d.int_id = s.district \
             WHERE s.office = $1",
            select_list::<StationRow>()
        );

        let rows = self
            .store
            .run_transaction(true, move |conn| {
                let lookup = lookup.clone();
                let children = children.clone();
                Box::pin(async move {
                    let parent: Option<IdRow> =
                        fetch_first(&mut *conn, sqlx::query(&lookup).bind(office.into_inner()))
                            .await?;
                    let Some(parent) = parent else {
                        return Err(DbError::NotFound(EntityKind::Office));
                    };

                    let rows: Vec<StationRow> =
                        fetch_all(&mut *conn, sqlx::query(&children).bind(parent.int_id)).await?;
                    Ok::<_, DbError>(rows)
                })
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let view = StationView {
                    district: DistrictId::from(row.district),
                    ru_name: row.ru_name,
                };
                (StationId::from(row.ext_id), view)
            })
            .collect())
    }

    /// Rename a station and reassign its district in one step.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Validation`] for a nil district id,
    /// [`DbError::NotFound`] for the district if it does not exist, and
    /// [`DbError::NotFound`] for the station otherwise if it does not exist.
    pub async fn update(
        &self,
        id: StationId,
        district: DistrictId,
        name: &Name,
    ) -> Result<(), DbError> {
        require_district(district)?;
        self.store.require_schema().await?;

        let name = name.as_str().to_owned();
        let district_sql = district_lookup_sql();

        self.store
            .run_transaction(false, move |conn| {
                let name = name.clone();
                let district_sql = district_sql.clone();
                Box::pin(async move {
                    let assigned: Option<SmallIdRow> = fetch_first(
                        &mut *conn,
                        sqlx::query(&district_sql).bind(district.into_inner()),
                    )
                    .await?;
                    let Some(assigned) = assigned else {
                        return Err(DbError::NotFound(EntityKind::District));
                    };

                    let result = sqlx::query(
                        "UPDATE station SET ru_name = $1, district = $2 WHERE ext_id = $3",
                    )
                    .bind(name)
                    .bind(assigned.int_id)
                    .bind(id.into_inner())
                    .execute(&mut *conn)
                    .await?;
                    found(result.rows_affected(), EntityKind::Station)
                })
            })
            .await
    }

    /// Delete a station.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no station has this id.
    pub async fn delete(&self, id: StationId) -> Result<(), DbError> {
        self.store.require_schema().await?;

        self.store
            .run_transaction(false, move |conn| {
                Box::pin(async move {
                    let result = sqlx::query("DELETE FROM station WHERE ext_id = $1")
                        .bind(id.into_inner())
                        .execute(conn)
                        .await?;
                    found(result.rows_affected(), EntityKind::Station)
                })
            })
            .await?;

        tracing::debug!(station = %id, "Deleted station");
        Ok(())
    }
}

/// A nil district id stands for "not given" in client payloads.
const fn require_district(district: DistrictId) -> Result<(), DbError> {
    if district.is_nil() {
        Err(DbError::Validation(ValidationError::MissingDistrict))
    } else {
        Ok(())
    }
}

fn office_lookup_sql() -> String {
    format!(
        "SELECT {} FROM office WHERE ext_id = $1",
        select_list::<IdRow>()
    )
}

fn district_lookup_sql() -> String {
    format!(
        "SELECT {} FROM district WHERE ext_id = $1",
        select_list::<SmallIdRow>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_district_is_a_validation_error() {
        assert!(matches!(
            require_district(DistrictId::from(uuid::Uuid::nil())),
            Err(DbError::Validation(ValidationError::MissingDistrict))
        ));
    }

    #[test]
    fn generated_district_is_accepted() {
        assert!(require_district(DistrictId::new()).is_ok());
    }

    #[test]
    fn parent_lookups_target_their_tables() {
        assert_eq!(
            office_lookup_sql(),
            "SELECT int_id FROM office WHERE ext_id = $1"
        );
        assert_eq!(
            district_lookup_sql(),
            "SELECT int_id FROM district WHERE ext_id = $1"
        );
    }
}
