//! REST handlers for the reference dataset.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `PUT` | `/v1/states` | Create a state |
//! | `GET` | `/v1/states` | List states |
//! | `POST` | `/v1/states/{id}` | Rename a state |
//! | `DELETE` | `/v1/states/{id}` | Delete a state |
//! | `PUT` | `/v1/states/{id}/offices` | Create an office in a state |
//! | `GET` | `/v1/states/{id}/offices` | List a state's offices |
//! | `POST` | `/v1/offices/{id}` | Rename an office |
//! | `DELETE` | `/v1/offices/{id}` | Delete an office |
//! | `PUT` | `/v1/offices/{id}/stations` | Create a station in an office |
//! | `GET` | `/v1/offices/{id}/stations` | List an office's stations |
//! | `POST` | `/v1/stations/{id}` | Rename and reassign a station |
//! | `DELETE` | `/v1/stations/{id}` | Delete a station |
//! | `PUT` | `/v1/districts` | Create a district |
//! | `GET` | `/v1/districts` | List districts |
//! | `POST` | `/v1/districts/{id}` | Rename a district |
//! | `DELETE` | `/v1/districts/{id}` | Delete a district |
//!
//! Path ids and bodies are validated here, before the store is called.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use voteapi_types::{
    Created, DistrictId, Name, OfficeId, StateId, StationId, StationView, ValidationError,
};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of every create/rename request except stations.
#[derive(Debug, serde::Deserialize)]
pub struct NamePayload {
    /// Display name.
    #[serde(default)]
    pub ru_name: String,
}

/// Body of station create/update requests.
#[derive(Debug, serde::Deserialize)]
pub struct StationPayload {
    /// Display name.
    #[serde(default)]
    pub ru_name: String,
    /// District the station is assigned to.
    #[serde(default)]
    pub district: Option<DistrictId>,
}

/// A JSON body whose rejection is turned into a 400 by the handler.
pub type JsonBody<T> = Result<Json<T>, JsonRejection>;

fn name_from(body: JsonBody<NamePayload>) -> Result<Name, ApiError> {
    let Json(payload) = body?;
    Ok(Name::parse(payload.ru_name)?)
}

fn station_from(body: JsonBody<StationPayload>) -> Result<(DistrictId, Name), ApiError> {
    let Json(payload) = body?;
    let name = Name::parse(payload.ru_name)?;
    let district = payload
        .district
        .filter(|d| !d.is_nil())
        .ok_or(ValidationError::MissingDistrict)?;
    Ok((district, name))
}

fn created(id: impl Into<uuid::Uuid>) -> (StatusCode, Json<Created>) {
    (StatusCode::CREATED, Json(Created { id: id.into() }))
}

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// `PUT /v1/states`
pub async fn create_state(
    State(state): State<Arc<AppState>>,
    body: JsonBody<NamePayload>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let name = name_from(body)?;
    let id = state.store.states().create(&name).await?;
    Ok(created(id))
}

/// `GET /v1/states`
pub async fn list_states(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<StateId, String>>, ApiError> {
    Ok(Json(state.store.states().list().await?))
}

/// `POST /v1/states/{id}`
pub async fn rename_state(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: JsonBody<NamePayload>,
) -> Result<StatusCode, ApiError> {
    let id: StateId = parse_id(&id_str)?;
    let name = name_from(body)?;
    state.store.states().rename(id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /v1/states/{id}`
pub async fn delete_state(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: StateId = parse_id(&id_str)?;
    state.store.states().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Offices
// ---------------------------------------------------------------------------

/// `PUT /v1/states/{id}/offices`
pub async fn create_office(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: JsonBody<NamePayload>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let parent: StateId = parse_id(&id_str)?;
    let name = name_from(body)?;
    let id = state.store.offices().create(parent, &name).await?;
    Ok(created(id))
}

/// `GET /v1/states/{id}/offices`
pub async fn list_offices(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<BTreeMap<OfficeId, String>>, ApiError> {
    let parent: StateId = parse_id(&id_str)?;
    Ok(Json(state.store.offices().list_for_state(parent).await?))
}

/// `POST /v1/offices/{id}`
pub async fn rename_office(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: JsonBody<NamePayload>,
) -> Result<StatusCode, ApiError> {
    let id: OfficeId = parse_id(&id_str)?;
    let name = name_from(body)?;
    state.store.offices().rename(id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /v1/offices/{id}`
pub async fn delete_office(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: OfficeId = parse_id(&id_str)?;
    state.store.offices().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Stations
// ---------------------------------------------------------------------------

/// `PUT /v1/offices/{id}/stations`
pub async fn create_station(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: JsonBody<StationPayload>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let office: OfficeId = parse_id(&id_str)?;
    let (district, name) = station_from(body)?;
    let id = state.store.stations().create(office, district, &name).await?;
    Ok(created(id))
}

/// `GET /v1/offices/{id}/stations`
pub async fn list_stations(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<BTreeMap<StationId, StationView>>, ApiError> {
    let office: OfficeId = parse_id(&id_str)?;
    Ok(Json(state.store.stations().list_for_office(office).await?))
}

/// `POST /v1/stations/{id}`
pub async fn update_station(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: JsonBody<StationPayload>,
) -> Result<StatusCode, ApiError> {
    let id: StationId = parse_id(&id_str)?;
    let (district, name) = station_from(body)?;
    state.store.stations().update(id, district, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /v1/stations/{id}`
pub async fn delete_station(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: StationId = parse_id(&id_str)?;
    state.store.stations().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Districts
// ---------------------------------------------------------------------------

/// `PUT /v1/districts`
pub async fn create_district(
    State(state): State<Arc<AppState>>,
    body: JsonBody<NamePayload>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let name = name_from(body)?;
    let id = state.store.districts().create(&name).await?;
    Ok(created(id))
}

/// `GET /v1/districts`
pub async fn list_districts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<DistrictId, String>>, ApiError> {
    Ok(Json(state.store.districts().list().await?))
}

/// `POST /v1/districts/{id}`
pub async fn rename_district(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: JsonBody<NamePayload>,
) -> Result<StatusCode, ApiError> {
    let id: DistrictId = parse_id(&id_str)?;
    let name = name_from(body)?;
    state.store.districts().rename(id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /v1/districts/{id}`
pub async fn delete_district(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: DistrictId = parse_id(&id_str)?;
    state.store.districts().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an external id from a path segment, returning an [`ApiError`] on
/// failure.
fn parse_id<T>(s: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = uuid::Error>,
{
    s.parse::<T>()
        .map_err(|e| ApiError::BadRequest(format!("invalid id {s}: {e}")))
}
