// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use places_proxy::api::router;
use places_proxy::config::AppConfig;
use places_proxy::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env();

    // Missing secrets are reported once here and again as 500s at call time.
    if config.verifier_configured() {
        info!("identity verifier configured");
    } else {
        warn!("no service-account credential; requests proceed with placeholder identities");
    }
    if !config.places_configured() {
        warn!("GOOGLE_PLACES_API_KEY not set; places routes will answer 500");
    }
    if !config.maps_configured() {
        warn!("no maps key available; geocode/directions/distance-matrix routes will answer 500");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    let state = AppState::from_config(config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(%addr, "places proxy listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

/// `LOG_FORMAT=json` selects structured output; anything else is pretty.
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
