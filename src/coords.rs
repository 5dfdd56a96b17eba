// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coordinate handling for upstream query construction.
//!
//! Clients send coordinates either as a structured `{"lat": .., "lng": ..}`
//! object or as a pre-formatted `"lat,lng"` string. Both shapes normalize to
//! the `"lat,lng"` form the Google web services expect, through a single
//! function so every route serializes coordinates identically.

use serde::Deserialize;
use serde_json::Number;

/// A client-supplied coordinate in either accepted shape.
///
/// `Number` is kept rather than `f64` so that the textual form of the value
/// survives normalization: `40.0` stays `40.0` and `40` stays `40` in the
/// upstream query string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Pair { lat: Number, lng: Number },
    Preformatted(String),
}

impl Coordinate {
    /// Normalize to the `"lat,lng"` wire form.
    pub fn normalize(&self) -> String {
        match self {
            Coordinate::Pair { lat, lng } => format!("{lat},{lng}"),
            Coordinate::Preformatted(s) => s.trim().to_string(),
        }
    }
}

/// Join a list of coordinates with `|`, the separator the directions and
/// distance-matrix services use for waypoints and origin/destination lists.
pub fn join_coordinates(coords: &[Coordinate]) -> String {
    coords
        .iter()
        .map(Coordinate::normalize)
        .collect::<Vec<_>>()
        .join("|")
}
