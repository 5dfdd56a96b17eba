// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Geocoding, directions and distance-matrix proxy routes.
//!
//! These use the Maps key (which defaults to the Places key when not set
//! separately). Same contract as the places routes; all responses are
//! relayed verbatim.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::coords::{join_coordinates, Coordinate};
use crate::error::ApiError;
use crate::state::AppState;

const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const DIRECTIONS_PATH: &str = "/maps/api/directions/json";
const DISTANCE_MATRIX_PATH: &str = "/maps/api/distancematrix/json";

const MAPS_KEY_MISSING: &str = "Google Maps API key is not configured";

const DEFAULT_TRAVEL_MODE: &str = "driving";

/// Resolve the Maps key or fail with the fixed configuration message.
fn maps_key(state: &AppState) -> Result<&str, ApiError> {
    state
        .config
        .maps_api_key
        .as_deref()
        .ok_or_else(|| ApiError::config(MAPS_KEY_MISSING))
}

/// Query parameters for geocoding; exactly one of the two is required.
#[derive(Debug, Deserialize, IntoParams)]
pub struct GeocodeQuery {
    /// Forward geocoding input.
    pub address: Option<String>,
    /// Reverse geocoding input as `"lat,lng"`.
    pub latlng: Option<String>,
}

/// Forward or reverse geocoding; upstream response relayed verbatim.
#[utoipa::path(
    get,
    path = "/api/geocode",
    tag = "Routing",
    params(GeocodeQuery),
    responses(
        (status = 200, description = "Upstream geocoding result", body = Object),
        (status = 400, description = "Neither address nor latlng supplied"),
        (status = 500, description = "Key not configured or upstream failure")
    )
)]
pub async fn geocode(
    State(state): State<AppState>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<Value>, ApiError> {
    let key = maps_key(&state)?;

    // Address wins when both are supplied.
    let mut query: Vec<(&str, String)> = Vec::with_capacity(2);
    if let Some(address) = params.address.filter(|a| !a.trim().is_empty()) {
        query.push(("address", address));
    } else if let Some(latlng) = params.latlng.filter(|l| !l.trim().is_empty()) {
        query.push(("latlng", latlng));
    } else {
        return Err(ApiError::validation("address or latlng is required"));
    }
    query.push(("key", key.to_string()));

    let payload = state
        .upstream
        .get_json(GEOCODE_PATH, &query)
        .await
        .map_err(|e| {
            error!(error = %e, "geocode upstream call failed");
            ApiError::upstream("Geocoding failed")
        })?;

    Ok(Json(payload))
}

/// Request body for directions.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DirectionsRequest {
    #[schema(value_type = Option<Object>)]
    pub origin: Option<Coordinate>,
    #[schema(value_type = Option<Object>)]
    pub destination: Option<Coordinate>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub waypoints: Option<Vec<Coordinate>>,
    /// Travel mode (default `driving`).
    pub mode: Option<String>,
    /// Ask upstream to reorder waypoints for the shortest route.
    #[serde(default)]
    pub optimize: bool,
}

/// Driving (or other mode) directions; upstream response relayed verbatim.
#[utoipa::path(
    post,
    path = "/api/directions",
    tag = "Routing",
    request_body = DirectionsRequest,
    responses(
        (status = 200, description = "Upstream directions result", body = Object),
        (status = 400, description = "origin/destination missing"),
        (status = 500, description = "Key not configured or upstream failure")
    )
)]
pub async fn directions(
    State(state): State<AppState>,
    Json(body): Json<DirectionsRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = maps_key(&state)?;

    let (origin, destination) = match (body.origin, body.destination) {
        (Some(origin), Some(destination)) => (origin, destination),
        _ => return Err(ApiError::validation("origin and destination are required")),
    };

    let mut query: Vec<(&str, String)> = vec![
        ("origin", origin.normalize()),
        ("destination", destination.normalize()),
        (
            "mode",
            body.mode
                .unwrap_or_else(|| DEFAULT_TRAVEL_MODE.to_string()),
        ),
    ];

    if let Some(waypoints) = body.waypoints.filter(|w| !w.is_empty()) {
        let mut joined = join_coordinates(&waypoints);
        if body.optimize {
            joined = format!("optimize:true|{joined}");
        }
        query.push(("waypoints", joined));
    }
    query.push(("key", key.to_string()));

    let payload = state
        .upstream
        .get_json(DIRECTIONS_PATH, &query)
        .await
        .map_err(|e| {
            error!(error = %e, "directions upstream call failed");
            ApiError::upstream("Directions request failed")
        })?;

    Ok(Json(payload))
}

/// Request body for the distance matrix.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DistanceMatrixRequest {
    #[schema(value_type = Option<Vec<Object>>)]
    pub origins: Option<Vec<Coordinate>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub destinations: Option<Vec<Coordinate>>,
    /// Travel mode (default `driving`).
    pub mode: Option<String>,
}

/// Travel time/distance matrix; upstream response relayed verbatim.
#[utoipa::path(
    post,
    path = "/api/distance-matrix",
    tag = "Routing",
    request_body = DistanceMatrixRequest,
    responses(
        (status = 200, description = "Upstream matrix result", body = Object),
        (status = 400, description = "origins/destinations missing"),
        (status = 500, description = "Key not configured or upstream failure")
    )
)]
pub async fn distance_matrix(
    State(state): State<AppState>,
    Json(body): Json<DistanceMatrixRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = maps_key(&state)?;

    let (origins, destinations) = match (body.origins, body.destinations) {
        (Some(origins), Some(destinations)) if !origins.is_empty() && !destinations.is_empty() => {
            (origins, destinations)
        }
        _ => return Err(ApiError::validation("origins and destinations are required")),
    };

    let query: Vec<(&str, String)> = vec![
        ("origins", join_coordinates(&origins)),
        ("destinations", join_coordinates(&destinations)),
        (
            "mode",
            body.mode
                .unwrap_or_else(|| DEFAULT_TRAVEL_MODE.to_string()),
        ),
        ("key", key.to_string()),
    ];

    let payload = state
        .upstream
        .get_json(DISTANCE_MATRIX_PATH, &query)
        .await
        .map_err(|e| {
            error!(error = %e, "distance matrix upstream call failed");
            ApiError::upstream("Distance matrix request failed")
        })?;

    Ok(Json(payload))
}
