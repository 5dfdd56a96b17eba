// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup into an
//! immutable [`AppConfig`] that is passed explicitly into route handlers via
//! application state. Nothing reads ambient environment variables at request
//! time, which keeps handlers deterministic under test.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `ALLOWED_ORIGINS` | Comma-separated CORS origins | permissive when unset |
//! | `GOOGLE_PLACES_API_KEY` | Secret key for Places web services | unset (places routes fail 500) |
//! | `GOOGLE_MAPS_API_KEY` | Secret key for geocode/directions/matrix | falls back to the Places key |
//! | `FIREBASE_SERVICE_ACCOUNT` | Inline service-account JSON | unset (verifier absent) |
//! | `FIREBASE_SERVICE_ACCOUNT_PATH` | Path to service-account JSON | unset |
//! | `FIREBASE_WEB_API_KEY` | Public web-client API key echoed by `/api/config` | unset |
//! | `FIREBASE_AUTH_DOMAIN` | Public auth domain echoed by `/api/config` | unset |
//! | `FIREBASE_PROJECT_ID` | Public project id | service-account project id |
//! | `FIREBASE_STORAGE_BUCKET` | Public storage bucket | unset |
//! | `FIREBASE_MESSAGING_SENDER_ID` | Public sender id | unset |
//! | `FIREBASE_APP_ID` | Public app id | unset |
//! | `UPSTREAM_BASE_URL` | Google API base URL override | `https://maps.googleapis.com` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fs;

use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPSTREAM_BASE_URL: &str = "https://maps.googleapis.com";

/// Subset of a Firebase service-account credential we actually consume.
///
/// Token verification needs only the project id (it fixes the expected
/// issuer and audience); the private key is never used because ID tokens
/// are verified against Google's public JWKS.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
}

/// Public Firebase web-client fields echoed verbatim by `/api/config`.
///
/// None of these are secrets; they are the same values a Firebase web app
/// embeds in its client bundle.
#[derive(Debug, Clone, Default)]
pub struct FirebaseWebConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

/// Immutable application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// CORS origins; an empty list means a permissive CORS layer.
    pub allowed_origins: Vec<String>,
    /// Secret Places API key. Absent means all places routes answer 500.
    pub places_api_key: Option<String>,
    /// Secret Maps API key; defaults to the Places key when unset.
    pub maps_api_key: Option<String>,
    /// Service-account credential; presence enables the identity verifier.
    pub service_account: Option<ServiceAccount>,
    /// Public client config echoed by the frontend-config route.
    pub firebase_web: FirebaseWebConfig,
    pub upstream_base_url: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Never fails: missing secrets leave the corresponding features
    /// disabled rather than aborting startup. A malformed service-account
    /// credential is logged and treated as absent.
    pub fn from_env() -> Self {
        let places_api_key = env_optional("GOOGLE_PLACES_API_KEY");
        let maps_api_key = env_optional("GOOGLE_MAPS_API_KEY").or_else(|| places_api_key.clone());
        let service_account = load_service_account();

        let firebase_web = FirebaseWebConfig {
            api_key: env_optional("FIREBASE_WEB_API_KEY"),
            auth_domain: env_optional("FIREBASE_AUTH_DOMAIN"),
            project_id: env_optional("FIREBASE_PROJECT_ID")
                .or_else(|| service_account.as_ref().map(|sa| sa.project_id.clone())),
            storage_bucket: env_optional("FIREBASE_STORAGE_BUCKET"),
            messaging_sender_id: env_optional("FIREBASE_MESSAGING_SENDER_ID"),
            app_id: env_optional("FIREBASE_APP_ID"),
        };

        Self {
            host: env_or_default("HOST", DEFAULT_HOST),
            port: env_optional("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            allowed_origins: env_optional("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            places_api_key,
            maps_api_key,
            service_account,
            firebase_web,
            upstream_base_url: env_or_default("UPSTREAM_BASE_URL", DEFAULT_UPSTREAM_BASE_URL),
        }
    }

    /// Whether the identity verifier has a credential to work with.
    pub fn verifier_configured(&self) -> bool {
        self.service_account.is_some()
    }

    pub fn places_configured(&self) -> bool {
        self.places_api_key.is_some()
    }

    /// Directions/distance-matrix/geocode availability for feature flags.
    pub fn maps_configured(&self) -> bool {
        self.maps_api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
            places_api_key: None,
            maps_api_key: None,
            service_account: None,
            firebase_web: FirebaseWebConfig::default(),
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
        }
    }
}

/// Load the service-account credential from inline JSON or a file path.
///
/// Inline JSON (`FIREBASE_SERVICE_ACCOUNT`) wins over the path variant.
fn load_service_account() -> Option<ServiceAccount> {
    let raw = if let Some(json) = env_optional("FIREBASE_SERVICE_ACCOUNT") {
        json
    } else {
        let path = env_optional("FIREBASE_SERVICE_ACCOUNT_PATH")?;
        match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "failed to read service-account file");
                return None;
            }
        }
    };

    match serde_json::from_str::<ServiceAccount>(&raw) {
        Ok(sa) => Some(sa),
        Err(e) => {
            tracing::warn!(error = %e, "service-account credential is not valid JSON; verifier disabled");
            None
        }
    }
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_nothing_configured() {
        let config = AppConfig::default();
        assert!(!config.places_configured());
        assert!(!config.maps_configured());
        assert!(!config.verifier_configured());
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn service_account_parses_from_json() {
        let sa: ServiceAccount =
            serde_json::from_str(r#"{"project_id":"demo-project","type":"service_account"}"#)
                .unwrap();
        assert_eq!(sa.project_id, "demo-project");
    }
}
