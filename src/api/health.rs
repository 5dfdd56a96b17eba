// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Health and frontend-configuration routes.
//!
//! These carry no auth gate. They expose at most booleans about which
//! secrets are configured; the one deliberate exception is `/api/maps-config`,
//! which returns the Maps key value itself so the client can boot the map
//! widget. That key is referrer-restricted on the Google side, which is why
//! it may travel to the browser while the Places key never does.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness and configuration status.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always "ok" while the process is serving.
    pub status: String,
    /// RFC 3339 timestamp of this response.
    pub timestamp: String,
    /// Whether the identity verifier has a credential.
    pub firebase_configured: bool,
    /// Whether the Places key is configured.
    pub places_configured: bool,
}

/// Maps widget bootstrap config.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapsConfigResponse {
    /// The browser Maps key, or null when unconfigured.
    pub api_key: Option<String>,
}

/// Public Firebase client fields.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseClientConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

/// Feature availability flags derived from which keys are configured.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub google_places: bool,
    pub directions: bool,
}

/// Non-secret configuration for the frontend.
#[derive(Debug, Serialize, ToSchema)]
pub struct FrontendConfigResponse {
    pub firebase: FirebaseClientConfig,
    pub features: FeatureFlags,
}

/// Liveness plus configuration booleans.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Config",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        firebase_configured: state.config.verifier_configured(),
        places_configured: state.config.places_configured(),
    })
}

/// The browser-facing Maps key.
#[utoipa::path(
    get,
    path = "/api/maps-config",
    tag = "Config",
    responses((status = 200, description = "Maps key or null", body = MapsConfigResponse))
)]
pub async fn maps_config(State(state): State<AppState>) -> Json<MapsConfigResponse> {
    Json(MapsConfigResponse {
        api_key: state.config.maps_api_key.clone(),
    })
}

/// Public identity-client configuration and feature flags.
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "Config",
    responses((status = 200, description = "Frontend config", body = FrontendConfigResponse))
)]
pub async fn frontend_config(State(state): State<AppState>) -> Json<FrontendConfigResponse> {
    let web = &state.config.firebase_web;
    Json(FrontendConfigResponse {
        firebase: FirebaseClientConfig {
            api_key: web.api_key.clone(),
            auth_domain: web.auth_domain.clone(),
            project_id: web.project_id.clone(),
            storage_bucket: web.storage_bucket.clone(),
            messaging_sender_id: web.messaging_sender_id.clone(),
            app_id: web.app_id.clone(),
        },
        features: FeatureFlags {
            google_places: state.config.places_configured(),
            directions: state.config.maps_configured(),
        },
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::super::testutil::*;

    #[tokio::test]
    async fn health_reports_status_and_config_booleans() {
        let app = app_with_keys(RecordingUpstream::ok());
        let response = app.oneshot(get_request("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["placesConfigured"], true);
        assert_eq!(body["firebaseConfigured"], false);
        assert!(body["timestamp"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn maps_config_returns_key_value() {
        let app = app_with_keys(RecordingUpstream::ok());
        let response = app.oneshot(get_request("/api/maps-config")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["apiKey"], MAPS_KEY);
    }

    #[tokio::test]
    async fn maps_config_returns_null_when_unconfigured() {
        let app = app_without_keys(RecordingUpstream::ok());
        let response = app.oneshot(get_request("/api/maps-config")).await.unwrap();
        let body = body_json(response).await;
        assert!(body["apiKey"].is_null());
    }

    #[tokio::test]
    async fn frontend_config_never_contains_the_places_key() {
        let app = app_with_keys(RecordingUpstream::ok());
        let response = app.oneshot(get_request("/api/config")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!raw.contains(PLACES_KEY));

        let body: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(body["features"]["googlePlaces"], true);
        assert_eq!(body["features"]["directions"], true);
    }

    #[tokio::test]
    async fn frontend_config_flags_follow_missing_keys() {
        let app = app_without_keys(RecordingUpstream::ok());
        let response = app.oneshot(get_request("/api/config")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["features"]["googlePlaces"], false);
        assert_eq!(body["features"]["directions"], false);
        assert!(body["firebase"]["projectId"].is_null());
    }
}
