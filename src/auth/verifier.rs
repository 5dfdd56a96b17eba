// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Firebase ID-token verification.
//!
//! Tokens are verified against Google's securetoken JWKS, fetched over
//! HTTPS and cached with a TTL. The expected issuer and audience are fixed
//! by the service-account project id at startup.
//!
//! When no service account is configured the verifier is never constructed;
//! callers hold an `Option<Arc<IdentityVerifier>>` and must handle the
//! absent case explicitly (the two gates do so differently).

use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::error::VerificationError;
use super::identity::Identity;

/// Google's JWKS endpoint for Firebase securetoken signatures.
const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// JWKS cache TTL (5 minutes).
const JWKS_CACHE_TTL: Duration = Duration::from_secs(300);

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Claims we read from a Firebase ID token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    /// Subject (Firebase user id).
    sub: String,
    /// Email, present on password/OAuth accounts.
    #[serde(default)]
    email: Option<String>,
}

struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// Verifies bearer tokens against the Firebase securetoken JWKS.
pub struct IdentityVerifier {
    jwks_url: String,
    /// Expected `iss` claim: `https://securetoken.google.com/<project_id>`.
    issuer: String,
    /// Expected `aud` claim: the project id.
    audience: String,
    cache: RwLock<Option<CacheEntry>>,
    client: reqwest::Client,
}

impl IdentityVerifier {
    /// Create a verifier for the given Firebase project.
    pub fn new(project_id: &str) -> Self {
        Self::with_jwks_url(project_id, SECURETOKEN_JWKS_URL)
    }

    /// Create a verifier fetching keys from a custom JWKS endpoint.
    ///
    /// Used by tests to point at a local fixture server.
    pub fn with_jwks_url(project_id: &str, jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            issuer: format!("https://securetoken.google.com/{project_id}"),
            audience: project_id.to_string(),
            cache: RwLock::new(None),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Verify a bearer token and return the identity it carries.
    pub async fn verify(&self, token: &str) -> Result<Identity, VerificationError> {
        let header = decode_header(token).map_err(|_| VerificationError::MalformedToken)?;

        let kid = header.kid.ok_or(VerificationError::NoMatchingKey)?;
        let (decoding_key, algorithm) = self.decoding_key_for(&kid).await?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<IdTokenClaims>(token, &decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    VerificationError::TokenExpired
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    VerificationError::InvalidSignature
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => VerificationError::InvalidIssuer,
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    VerificationError::InvalidAudience
                }
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                    VerificationError::TokenNotYetValid
                }
                _ => VerificationError::MalformedToken,
            },
        )?;

        Ok(Identity {
            subject: token_data.claims.sub,
            email: token_data.claims.email,
        })
    }

    /// Fetch JWKS (with caching) and resolve the key for `kid`.
    async fn decoding_key_for(
        &self,
        kid: &str,
    ) -> Result<(DecodingKey, Algorithm), VerificationError> {
        let jwks = self.get_jwks().await?;

        let jwk = jwks
            .keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid))
            .ok_or(VerificationError::NoMatchingKey)?;

        jwk_to_decoding_key(jwk)
    }

    async fn get_jwks(&self) -> Result<JwkSet, VerificationError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < JWKS_CACHE_TTL {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(CacheEntry {
                jwks: jwks.clone(),
                fetched_at: Instant::now(),
            });
        }

        Ok(jwks)
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, VerificationError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| VerificationError::JwksFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerificationError::JwksFetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| VerificationError::JwksFetch(e.to_string()))
    }
}

/// Convert a JWK to a DecodingKey. Firebase signs with RS256 only.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), VerificationError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e).map_err(|e| {
                VerificationError::Internal(format!("failed to build RSA key: {e}"))
            })?;
            Ok((key, Algorithm::RS256))
        }
        _ => Err(VerificationError::Internal(
            "unsupported key type in JWKS".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_and_audience_derive_from_project_id() {
        let verifier = IdentityVerifier::new("demo-project");
        assert_eq!(
            verifier.issuer,
            "https://securetoken.google.com/demo-project"
        );
        assert_eq!(verifier.audience, "demo-project");
        assert_eq!(verifier.jwks_url, SECURETOKEN_JWKS_URL);
    }

    #[tokio::test]
    async fn garbage_token_is_malformed_before_any_fetch() {
        // A token that fails header decoding never touches the network.
        let verifier = IdentityVerifier::with_jwks_url("demo-project", "http://127.0.0.1:1/jwks");
        let err = verifier.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, VerificationError::MalformedToken));
    }

    #[tokio::test]
    async fn unreachable_jwks_surfaces_fetch_error() {
        let verifier = IdentityVerifier::with_jwks_url("demo-project", "http://127.0.0.1:1/jwks");
        // Structurally valid unsigned JWT header with a kid, body irrelevant.
        // header: {"alg":"RS256","typ":"JWT","kid":"k1"}
        let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCIsImtpZCI6ImsxIn0.eyJzdWIiOiJ1In0.c2ln";
        let err = verifier.verify(token).await.unwrap_err();
        assert!(matches!(err, VerificationError::JwksFetch(_)));
    }
}
