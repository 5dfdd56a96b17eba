// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::config::AppConfig;
use crate::upstream::{GoogleApiClient, Upstream};

/// Shared application state: immutable config plus the two outbound clients.
///
/// There is no mutable state here; every request reads the same
/// configuration snapshot taken at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Absent when no service-account credential is configured. The two
    /// auth gates handle absence differently; see `auth::gate`.
    pub verifier: Option<Arc<IdentityVerifier>>,
    pub upstream: Arc<dyn Upstream>,
}

impl AppState {
    /// Build state from configuration, constructing the real upstream
    /// client and, when configured, the identity verifier.
    pub fn from_config(config: AppConfig) -> Self {
        let verifier = config
            .service_account
            .as_ref()
            .map(|sa| Arc::new(IdentityVerifier::new(&sa.project_id)));
        let upstream: Arc<dyn Upstream> = Arc::new(GoogleApiClient::new(&config.upstream_base_url));

        Self {
            config: Arc::new(config),
            verifier,
            upstream,
        }
    }

    /// State with an injected upstream, for tests.
    #[cfg(test)]
    pub fn for_tests(config: AppConfig, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            config: Arc::new(config),
            verifier: None,
            upstream,
        }
    }
}
