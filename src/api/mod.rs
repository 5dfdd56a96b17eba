// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::attach_identity;
use crate::state::AppState;

pub mod health;
pub mod places;
pub mod routing;

pub fn router(state: AppState) -> Router {
    // The proxied geo routes carry the optional identity gate; their access
    // control is the server-side key, identity is observability only.
    let geo_routes = Router::new()
        .route("/places/nearby", post(places::nearby_search))
        .route("/places/text-search", post(places::text_search))
        .route("/places/details/{place_id}", get(places::place_details))
        .route("/places/autocomplete", get(places::autocomplete))
        .route("/geocode", get(routing::geocode))
        .route("/directions", post(routing::directions))
        .route("/distance-matrix", post(routing::distance_matrix))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            attach_identity,
        ));

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/maps-config", get(health::maps_config))
        .route("/config", get(health::frontend_config))
        .merge(geo_routes)
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS restricted to the configured origins; permissive when none are set
/// (local development).
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::maps_config,
        health::frontend_config,
        places::nearby_search,
        places::text_search,
        places::place_details,
        places::autocomplete,
        routing::geocode,
        routing::directions,
        routing::distance_matrix
    ),
    components(
        schemas(
            health::HealthResponse,
            health::MapsConfigResponse,
            health::FrontendConfigResponse,
            health::FirebaseClientConfig,
            health::FeatureFlags,
            places::NearbySearchRequest,
            places::TextSearchRequest,
            routing::DirectionsRequest,
            routing::DistanceMatrixRequest,
            crate::auth::Identity
        )
    ),
    tags(
        (name = "Config", description = "Health and non-secret configuration"),
        (name = "Places", description = "Proxied Google Places services"),
        (name = "Routing", description = "Proxied geocoding, directions and distance matrix")
    )
)]
struct ApiDoc;
