// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Verification Module
//!
//! Firebase ID-token verification for the proxy API.
//!
//! ## Auth Flow
//!
//! 1. Frontend authenticates the user with Firebase Auth
//! 2. Frontend sends `Authorization: Bearer <Firebase ID token>`
//! 3. Proxy server:
//!    - Fetches Google's securetoken JWKS via HTTPS (TTL-cached)
//!    - Verifies signature, expiry, issuer, audience
//!    - Extracts `sub` and `email` into a request-scoped [`Identity`]
//!
//! ## Gates
//!
//! Routes opt into one of two gates ([`gate`]): the mandatory gate rejects
//! unverified callers with 401, the optional gate only annotates the request
//! and never rejects. The proxied geo routes use the optional gate; their
//! protection is the server-side API key, not authentication.

pub mod error;
pub mod gate;
pub mod identity;
pub mod verifier;

pub use error::VerificationError;
pub use gate::attach_identity;
pub use identity::Identity;
pub use verifier::IdentityVerifier;
