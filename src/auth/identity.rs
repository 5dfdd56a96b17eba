// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped identity representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Subject id assigned when no verifier is configured (local development).
pub const DEV_SUBJECT: &str = "dev-user";

/// Subject id assigned by the optional gate when no identity verifies.
pub const ANONYMOUS_SUBJECT: &str = "anonymous";

/// The identity attached to a request for the duration of its handling.
///
/// Never persisted; it exists only in the request extensions so handlers and
/// trace output can name who made the call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    /// Canonical subject identifier (Firebase `sub` claim, or a placeholder).
    pub subject: String,
    /// Email claim, when the token carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    /// Placeholder used by the mandatory gate when no verifier is configured.
    pub fn development() -> Self {
        Self {
            subject: DEV_SUBJECT.to_string(),
            email: None,
        }
    }

    /// Placeholder used by the optional gate when verification is skipped
    /// or fails.
    pub fn anonymous() -> Self {
        Self {
            subject: ANONYMOUS_SUBJECT.to_string(),
            email: None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.subject == ANONYMOUS_SUBJECT
    }
}
