// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The two auth gates, as Axum middleware.
//!
//! Both gates attach an [`Identity`] to the request extensions before the
//! handler runs. They differ in what happens when no identity verifies:
//!
//! - [`require_identity`] rejects with 401 (unless the verifier itself is
//!   absent, in which case it authorizes with the development placeholder
//!   and makes no network call).
//! - [`attach_identity`] never rejects; it falls back to the anonymous
//!   placeholder. The proxy routes use this one: their security comes from
//!   keeping the API keys server-side, and identity is collected only for
//!   observability.
//!
//! These are deliberately two separately named functions, not one
//! parameterized gate; the "verifier absent" branches look similar but mean
//! different things, and merging them has caused regressions before.
//!
//! No route on the current API surface mounts [`require_identity`]; it is
//! kept wired and tested for protected routes to come.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use super::error::VerificationError;
use super::identity::Identity;
use crate::state::AppState;

/// Mandatory gate: reject the request unless an identity is authorized.
///
/// Rejections short-circuit; the route handler never runs and no upstream
/// call is made.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(verifier) = state.verifier.as_ref() else {
        // No verifier configured: authorize with the development
        // placeholder. This branch must not become a rejection.
        request.extensions_mut().insert(Identity::development());
        return next.run(request).await;
    };

    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(e) => return unauthorized(e),
    };

    match verifier.verify(token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            warn!(error = %e, "bearer token rejected");
            unauthorized(e)
        }
    }
}

/// Optional gate: always authorize, attaching whatever identity verifies.
///
/// Any verification failure (including JWKS fetch failure) is swallowed and
/// the request continues anonymously; the failure never reaches the client.
pub async fn attach_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match (state.verifier.as_ref(), bearer_token(request.headers())) {
        (Some(verifier), Ok(token)) => match verifier.verify(token).await {
            Ok(identity) => identity,
            Err(e) => {
                debug!(error = %e, "optional identity verification failed; continuing anonymously");
                Identity::anonymous()
            }
        },
        _ => Identity::anonymous(),
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, VerificationError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(VerificationError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| VerificationError::InvalidAuthHeader)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(VerificationError::InvalidAuthHeader)
}

/// Render a mandatory-gate rejection.
///
/// Always 401, regardless of the underlying cause: a caller of a protected
/// route that presents no acceptable identity is unauthorized, even when the
/// root cause was a key-fetch failure on our side (the detail stays in the
/// logs and the `error_code`).
fn unauthorized(e: VerificationError) -> Response {
    let body = serde_json::json!({
        "error": e.to_string(),
        "error_code": e.error_code(),
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
