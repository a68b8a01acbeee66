#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the pincode sales server.
//!
//! The sidebar statistics and markers are served in the same shape as the
//! files written by the CLI; the types here cover the rest of the API.

use serde::{Deserialize, Serialize};

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `true` while the server is answering.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable failure message.
    pub error: String,
}

/// How the load behind the map went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummary {
    /// Path or URL of the CSV.
    pub source: String,
    /// Data rows read.
    pub rows: usize,
    /// Rows with every field present.
    pub valid: usize,
    /// Rows dropped for missing fields.
    pub invalid: usize,
    /// Records placed on the map.
    pub markers: usize,
    /// Records whose pincode had no match.
    pub not_found: usize,
    /// Records skipped after a failed lookup.
    pub skipped: usize,
    /// Wall time of the load in milliseconds.
    pub elapsed_ms: u64,
}
