// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Google Places proxy routes: nearby search, text search, place details,
//! autocomplete.
//!
//! Every handler follows the same contract: check the secret key is
//! configured (500 otherwise), validate required fields (400 naming them),
//! build the upstream query, make exactly one GET, and relay the JSON.
//! Only the nearby-search response is reshaped; everything else passes
//! through verbatim, including upstream error payloads.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{Number, Value};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::state::AppState;

const NEARBY_SEARCH_PATH: &str = "/maps/api/place/nearbysearch/json";
const TEXT_SEARCH_PATH: &str = "/maps/api/place/textsearch/json";
const PLACE_DETAILS_PATH: &str = "/maps/api/place/details/json";
const AUTOCOMPLETE_PATH: &str = "/maps/api/place/autocomplete/json";

const PLACES_KEY_MISSING: &str = "Google Places API key is not configured";

/// Default search radius in meters for nearby and text search.
const DEFAULT_SEARCH_RADIUS: u32 = 8047;

/// Default radius in meters for autocomplete location biasing.
const DEFAULT_AUTOCOMPLETE_RADIUS: u32 = 50000;

/// Fields requested from the details service when the caller names none.
const DEFAULT_DETAILS_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,opening_hours,geometry,website,rating";

/// Allow-list applied to each entry of a nearby-search `results` array.
/// This is the one place upstream fields are stripped before relaying.
const NEARBY_RESULT_FIELDS: [&str; 9] = [
    "place_id",
    "name",
    "vicinity",
    "geometry",
    "types",
    "rating",
    "user_ratings_total",
    "business_status",
    "opening_hours",
];

/// Resolve the Places key or fail with the fixed configuration message.
fn places_key(state: &AppState) -> Result<&str, ApiError> {
    state
        .config
        .places_api_key
        .as_deref()
        .ok_or_else(|| ApiError::config(PLACES_KEY_MISSING))
}

/// Request body for nearby search.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NearbySearchRequest {
    #[schema(value_type = Option<f64>)]
    pub lat: Option<Number>,
    #[schema(value_type = Option<f64>)]
    pub lng: Option<Number>,
    /// Search radius in meters (default 8047, about five miles).
    #[schema(value_type = Option<f64>)]
    pub radius: Option<Number>,
    /// Place category filter (e.g. `restaurant`).
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    pub keyword: Option<String>,
}

/// Nearby place search, with the response projected to an allow-list.
#[utoipa::path(
    post,
    path = "/api/places/nearby",
    tag = "Places",
    request_body = NearbySearchRequest,
    responses(
        (status = 200, description = "Filtered place list", body = Object),
        (status = 400, description = "lat/lng missing"),
        (status = 500, description = "Key not configured or upstream failure")
    )
)]
pub async fn nearby_search(
    State(state): State<AppState>,
    Json(body): Json<NearbySearchRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = places_key(&state)?;

    let (lat, lng) = match (body.lat, body.lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(ApiError::validation("lat and lng are required")),
    };

    let mut query: Vec<(&str, String)> = vec![
        ("location", format!("{lat},{lng}")),
        ("radius", radius_or(body.radius, DEFAULT_SEARCH_RADIUS)),
    ];
    if let Some(place_type) = body.place_type {
        query.push(("type", place_type));
    }
    if let Some(keyword) = body.keyword {
        query.push(("keyword", keyword));
    }
    query.push(("key", key.to_string()));

    let payload = state
        .upstream
        .get_json(NEARBY_SEARCH_PATH, &query)
        .await
        .map_err(|e| {
            error!(error = %e, "nearby search upstream call failed");
            ApiError::upstream("Nearby search failed")
        })?;

    Ok(Json(filter_nearby_payload(payload)))
}

/// Request body for text search.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TextSearchRequest {
    pub query: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub lat: Option<Number>,
    #[schema(value_type = Option<f64>)]
    pub lng: Option<Number>,
    #[schema(value_type = Option<f64>)]
    pub radius: Option<Number>,
}

/// Free-text place search; upstream response relayed verbatim.
#[utoipa::path(
    post,
    path = "/api/places/text-search",
    tag = "Places",
    request_body = TextSearchRequest,
    responses(
        (status = 200, description = "Upstream place list", body = Object),
        (status = 400, description = "query missing"),
        (status = 500, description = "Key not configured or upstream failure")
    )
)]
pub async fn text_search(
    State(state): State<AppState>,
    Json(body): Json<TextSearchRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = places_key(&state)?;

    let Some(text) = body.query.filter(|q| !q.trim().is_empty()) else {
        return Err(ApiError::validation("query is required"));
    };

    let mut query: Vec<(&str, String)> = vec![("query", text)];
    if let (Some(lat), Some(lng)) = (body.lat, body.lng) {
        query.push(("location", format!("{lat},{lng}")));
        query.push(("radius", radius_or(body.radius, DEFAULT_SEARCH_RADIUS)));
    }
    query.push(("key", key.to_string()));

    let payload = state
        .upstream
        .get_json(TEXT_SEARCH_PATH, &query)
        .await
        .map_err(|e| {
            error!(error = %e, "text search upstream call failed");
            ApiError::upstream("Text search failed")
        })?;

    Ok(Json(payload))
}

/// Query parameters for place details.
#[derive(Debug, Deserialize, IntoParams)]
pub struct DetailsQuery {
    /// Comma-separated field list; a sensible default is applied when absent.
    pub fields: Option<String>,
}

/// Place details lookup by place id.
#[utoipa::path(
    get,
    path = "/api/places/details/{place_id}",
    tag = "Places",
    params(
        ("place_id" = String, Path, description = "Google place id"),
        DetailsQuery
    ),
    responses(
        (status = 200, description = "Upstream place details", body = Object),
        (status = 500, description = "Key not configured or upstream failure")
    )
)]
pub async fn place_details(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
    Query(params): Query<DetailsQuery>,
) -> Result<Json<Value>, ApiError> {
    let key = places_key(&state)?;

    let fields = params
        .fields
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DETAILS_FIELDS.to_string());

    let query: Vec<(&str, String)> = vec![
        ("place_id", place_id),
        ("fields", fields),
        ("key", key.to_string()),
    ];

    let payload = state
        .upstream
        .get_json(PLACE_DETAILS_PATH, &query)
        .await
        .map_err(|e| {
            error!(error = %e, "place details upstream call failed");
            ApiError::upstream("Place details lookup failed")
        })?;

    Ok(Json(payload))
}

/// Query parameters for autocomplete.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AutocompleteQuery {
    pub input: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    /// Biasing radius in meters (default 50000).
    pub radius: Option<String>,
    /// Upstream type filter (e.g. `establishment`).
    pub types: Option<String>,
}

/// Place autocomplete; upstream response relayed verbatim.
#[utoipa::path(
    get,
    path = "/api/places/autocomplete",
    tag = "Places",
    params(AutocompleteQuery),
    responses(
        (status = 200, description = "Upstream predictions", body = Object),
        (status = 400, description = "input missing"),
        (status = 500, description = "Key not configured or upstream failure")
    )
)]
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteQuery>,
) -> Result<Json<Value>, ApiError> {
    let key = places_key(&state)?;

    let Some(input) = params.input.filter(|i| !i.trim().is_empty()) else {
        return Err(ApiError::validation("input is required"));
    };

    let mut query: Vec<(&str, String)> = vec![("input", input)];
    if let (Some(lat), Some(lng)) = (params.lat, params.lng) {
        query.push(("location", format!("{lat},{lng}")));
        query.push((
            "radius",
            params
                .radius
                .unwrap_or_else(|| DEFAULT_AUTOCOMPLETE_RADIUS.to_string()),
        ));
    }
    if let Some(types) = params.types {
        query.push(("types", types));
    }
    query.push(("key", key.to_string()));

    let payload = state
        .upstream
        .get_json(AUTOCOMPLETE_PATH, &query)
        .await
        .map_err(|e| {
            error!(error = %e, "autocomplete upstream call failed");
            ApiError::upstream("Autocomplete failed")
        })?;

    Ok(Json(payload))
}

fn radius_or(radius: Option<Number>, default: u32) -> String {
    radius
        .map(|r| r.to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Project each nearby-search result down to the allow-listed fields.
///
/// The payload envelope (`status` and friends) is left untouched; values of
/// kept fields are relayed unchanged.
fn filter_nearby_payload(mut payload: Value) -> Value {
    if let Some(results) = payload.get_mut("results").and_then(Value::as_array_mut) {
        for entry in results.iter_mut() {
            if let Value::Object(fields) = entry {
                fields.retain(|name, _| NEARBY_RESULT_FIELDS.contains(&name.as_str()));
            }
        }
    }
    payload
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use super::super::testutil::*;
    use super::*;

    #[tokio::test]
    async fn nearby_rejects_when_key_missing_without_calling_upstream() {
        let upstream = RecordingUpstream::ok();
        let app = app_without_keys(upstream.clone());
        let response = app
            .oneshot(post_json(
                "/api/places/nearby",
                json!({"lat": 40.0, "lng": -75.0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], PLACES_KEY_MISSING);
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn nearby_rejects_missing_coordinates_without_calling_upstream() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        let response = app
            .oneshot(post_json("/api/places/nearby", json!({"lat": 40.0})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "lat and lng are required");
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn nearby_builds_location_radius_and_key() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        let response = app
            .oneshot(post_json(
                "/api/places/nearby",
                json!({"lat": 40.0, "lng": -75.0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (path, query) = upstream.last_call();
        assert_eq!(path, "/maps/api/place/nearbysearch/json");
        assert_eq!(param(&query, "location").unwrap(), "40.0,-75.0");
        assert_eq!(param(&query, "radius").unwrap(), "8047");
        assert_eq!(param(&query, "key").unwrap(), PLACES_KEY);
    }

    #[tokio::test]
    async fn nearby_passes_optional_type_and_keyword() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        app.oneshot(post_json(
            "/api/places/nearby",
            json!({"lat": 1, "lng": 2, "radius": 500, "type": "cafe", "keyword": "espresso"}),
        ))
        .await
        .unwrap();

        let (_, query) = upstream.last_call();
        assert_eq!(param(&query, "radius").unwrap(), "500");
        assert_eq!(param(&query, "type").unwrap(), "cafe");
        assert_eq!(param(&query, "keyword").unwrap(), "espresso");
    }

    #[tokio::test]
    async fn nearby_results_are_projected_to_allow_list() {
        let upstream = RecordingUpstream::with_response(json!({
            "status": "OK",
            "html_attributions": [],
            "results": [{
                "place_id": "abc",
                "name": "Cafe",
                "vicinity": "Main St",
                "geometry": {"location": {"lat": 1.0, "lng": 2.0}},
                "types": ["cafe"],
                "rating": 4.5,
                "user_ratings_total": 12,
                "business_status": "OPERATIONAL",
                "opening_hours": {"open_now": true},
                "photos": [{"photo_reference": "should-not-leak"}],
                "reference": "legacy",
                "scope": "GOOGLE"
            }]
        }));
        let app = app_with_keys(upstream.clone());
        let response = app
            .oneshot(post_json(
                "/api/places/nearby",
                json!({"lat": 1, "lng": 2}),
            ))
            .await
            .unwrap();

        let body = body_json(response).await;
        let entry = body["results"][0].as_object().unwrap();
        let mut keys: Vec<_> = entry.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "business_status",
                "geometry",
                "name",
                "opening_hours",
                "place_id",
                "rating",
                "types",
                "user_ratings_total",
                "vicinity",
            ]
        );
        assert_eq!(entry["rating"], 4.5);
        // Envelope fields outside results[] are relayed untouched.
        assert_eq!(body["status"], "OK");
    }

    #[tokio::test]
    async fn nearby_upstream_failure_is_a_generic_500() {
        let upstream = RecordingUpstream::failing();
        let app = app_with_keys(upstream.clone());
        let response = app
            .oneshot(post_json(
                "/api/places/nearby",
                json!({"lat": 1, "lng": 2}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Nearby search failed");
    }

    #[tokio::test]
    async fn text_search_requires_query() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        let response = app
            .oneshot(post_json("/api/places/text-search", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "query is required");
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn text_search_with_location_adds_default_radius() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        app.oneshot(post_json(
            "/api/places/text-search",
            json!({"query": "pizza", "lat": 40.0, "lng": -75.0}),
        ))
        .await
        .unwrap();

        let (path, query) = upstream.last_call();
        assert_eq!(path, "/maps/api/place/textsearch/json");
        assert_eq!(param(&query, "query").unwrap(), "pizza");
        assert_eq!(param(&query, "location").unwrap(), "40.0,-75.0");
        assert_eq!(param(&query, "radius").unwrap(), "8047");
    }

    #[tokio::test]
    async fn text_search_without_location_omits_it() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        app.oneshot(post_json(
            "/api/places/text-search",
            json!({"query": "pizza"}),
        ))
        .await
        .unwrap();

        let (_, query) = upstream.last_call();
        assert!(param(&query, "location").is_none());
        assert!(param(&query, "radius").is_none());
    }

    #[tokio::test]
    async fn details_applies_default_field_list() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        app.oneshot(get_request("/api/places/details/ChIJabc123"))
            .await
            .unwrap();

        let (path, query) = upstream.last_call();
        assert_eq!(path, "/maps/api/place/details/json");
        assert_eq!(param(&query, "place_id").unwrap(), "ChIJabc123");
        assert_eq!(
            param(&query, "fields").unwrap(),
            "name,formatted_address,formatted_phone_number,opening_hours,geometry,website,rating"
        );
    }

    #[tokio::test]
    async fn details_honors_explicit_fields() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        app.oneshot(get_request("/api/places/details/ChIJabc123?fields=name,rating"))
            .await
            .unwrap();

        let (_, query) = upstream.last_call();
        assert_eq!(param(&query, "fields").unwrap(), "name,rating");
    }

    #[tokio::test]
    async fn autocomplete_requires_input() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        let response = app
            .oneshot(get_request("/api/places/autocomplete"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "input is required");
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn autocomplete_defaults_radius_when_biased() {
        let upstream = RecordingUpstream::ok();
        let app = app_with_keys(upstream.clone());
        app.oneshot(get_request(
            "/api/places/autocomplete?input=caf&lat=40.0&lng=-75.0&types=establishment",
        ))
        .await
        .unwrap();

        let (path, query) = upstream.last_call();
        assert_eq!(path, "/maps/api/place/autocomplete/json");
        assert_eq!(param(&query, "input").unwrap(), "caf");
        assert_eq!(param(&query, "location").unwrap(), "40.0,-75.0");
        assert_eq!(param(&query, "radius").unwrap(), "50000");
        assert_eq!(param(&query, "types").unwrap(), "establishment");
    }

    #[tokio::test]
    async fn upstream_error_payloads_pass_through_unchanged() {
        // Quota errors and the like are upstream JSON, not transport
        // failures; we relay them as-is.
        let upstream = RecordingUpstream::with_response(json!({
            "status": "OVER_QUERY_LIMIT",
            "error_message": "You have exceeded your daily request quota",
            "results": []
        }));
        let app = app_with_keys(upstream.clone());
        let response = app
            .oneshot(post_json(
                "/api/places/text-search",
                json!({"query": "pizza"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "OVER_QUERY_LIMIT");
    }
}
