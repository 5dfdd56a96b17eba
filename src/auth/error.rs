// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity verification errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure modes of bearer-token verification.
///
/// On the mandatory gate these become 401 responses; the optional gate
/// swallows them entirely and falls back to an anonymous identity.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Authorization header is required")]
    MissingAuthHeader,

    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,

    #[error("Token is malformed")]
    MalformedToken,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token issuer is invalid")]
    InvalidIssuer,

    #[error("Token audience is invalid")]
    InvalidAudience,

    #[error("Token is not yet valid")]
    TokenNotYetValid,

    #[error("Failed to fetch JWKS: {0}")]
    JwksFetch(String),

    #[error("No matching key found in JWKS")]
    NoMatchingKey,

    #[error("Internal verification error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct VerificationErrorBody {
    error: String,
    error_code: String,
}

impl VerificationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::MissingAuthHeader => "missing_auth_header",
            VerificationError::InvalidAuthHeader => "invalid_auth_header",
            VerificationError::MalformedToken => "malformed_token",
            VerificationError::InvalidSignature => "invalid_signature",
            VerificationError::TokenExpired => "token_expired",
            VerificationError::InvalidIssuer => "invalid_issuer",
            VerificationError::InvalidAudience => "invalid_audience",
            VerificationError::TokenNotYetValid => "token_not_yet_valid",
            VerificationError::JwksFetch(_) => "jwks_fetch_error",
            VerificationError::NoMatchingKey => "no_matching_key",
            VerificationError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            VerificationError::JwksFetch(_) | VerificationError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for VerificationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(VerificationErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_header_returns_401() {
        let response = VerificationError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[test]
    fn jwks_failures_are_server_errors() {
        let err = VerificationError::JwksFetch("timed out".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            VerificationError::TokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
