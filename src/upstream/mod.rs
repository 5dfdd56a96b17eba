// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound client for the Google Maps Platform web services.
//!
//! Every proxy route performs exactly one GET through the [`Upstream`]
//! trait. The trait exists so tests can substitute a recording fake and
//! assert on call counts and constructed query strings; production code
//! uses [`GoogleApiClient`].
//!
//! No retries, no caching: one failed call fails the whole request.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Outbound request timeout.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("upstream response was not valid JSON: {0}")]
    InvalidBody(String),
}

/// One GET against a third-party endpoint, returning its JSON body.
///
/// `query` is a flat key/value list; the secret API key travels in it like
/// any other parameter and must never appear in logs or client responses.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn get_json(&self, path: &str, query: &[(&str, String)])
        -> Result<Value, UpstreamError>;
}

/// Production [`Upstream`] implementation backed by reqwest.
pub struct GoogleApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl GoogleApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

#[async_trait]
impl Upstream for GoogleApiClient {
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, UpstreamError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| UpstreamError::Request(format!("invalid upstream URL: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }

        debug!(path, "calling upstream");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidBody(e.to_string()))
    }
}
