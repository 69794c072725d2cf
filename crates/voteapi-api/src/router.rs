//! Axum router construction.
//!
//! Assembles all `/v1` routes into a single [`Router`]. The admin gate is
//! a route layer, so only matched routes are gated and unknown paths
//! still answer 404. CORS is open because the browser frontends call the
//! API cross-origin.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{post, put};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::error;
use crate::handlers;
use crate::state::AppState;

/// Build the complete router.
///
/// See [`handlers`] for the endpoint table.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // States
        .route(
            "/v1/states",
            put(handlers::create_state).get(handlers::list_states),
        )
        .route(
            "/v1/states/{id}",
            post(handlers::rename_state).delete(handlers::delete_state),
        )
        .route(
            "/v1/states/{id}/offices",
            put(handlers::create_office).get(handlers::list_offices),
        )
        // Offices
        .route(
            "/v1/offices/{id}",
            post(handlers::rename_office).delete(handlers::delete_office),
        )
        .route(
            "/v1/offices/{id}/stations",
            put(handlers::create_station).get(handlers::list_stations),
        )
        // Stations
        .route(
            "/v1/stations/{id}",
            post(handlers::update_station).delete(handlers::delete_station),
        )
        // Districts
        .route(
            "/v1/districts",
            put(handlers::create_district).get(handlers::list_districts),
        )
        .route(
            "/v1/districts/{id}",
            post(handlers::rename_district).delete(handlers::delete_district),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_admin,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(error::log_failures))
                .layer(cors),
        )
        .with_state(state)
}
