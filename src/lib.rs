// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Places Proxy - Credential-Hiding Geo API Gateway
//!
//! This crate sits between a browser frontend and the Google Maps Platform
//! web services, forwarding sanitized requests so that secret API keys never
//! reach the client. Every route is a stateless translation: validate input,
//! build the upstream query, make one outbound call, relay the JSON.
//!
//! ## Modules
//!
//! - `api` - HTTP route handlers (Axum)
//! - `auth` - Firebase identity verification and the two auth gates
//! - `upstream` - Outbound Google API client
//! - `coords` - Coordinate shape normalization
//! - `config` - Environment-driven immutable configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod coords;
pub mod error;
pub mod state;
pub mod upstream;
