#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Enrichment and aggregation of sales records.
//!
//! [`engine::run`] walks the valid records of one CSV load in order,
//! folding each into [`AggregateStats`](pincode_sales_models::AggregateStats)
//! and then geocoding its postal code. Lookups are strictly sequential:
//! the next record is not touched until the current lookup has resolved,
//! and an optional delay is inserted between lookups to stay under the
//! geocoding service's rate limits.
//!
//! [`session::LoadSession`] wraps one complete load (read CSV, enrich,
//! report) and owns all of its state.

pub mod engine;
pub mod progress;
pub mod session;

#[cfg(test)]
mod testing;

use std::time::Duration;

use pincode_sales_models::{EnrichedRecord, LocationKey};

pub use engine::{EnrichmentReport, run};
pub use session::{LoadSession, SessionError, SessionOutput};

/// Receives one marker per successfully geocoded record, in input order.
pub trait MarkerSink: Send {
    /// Draws a marker for `record`. `record.coordinates` is always set.
    fn draw_marker(&mut self, record: &EnrichedRecord);
}

impl MarkerSink for Vec<EnrichedRecord> {
    fn draw_marker(&mut self, record: &EnrichedRecord) {
        self.push(record.clone());
    }
}

/// Settings for one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichOptions {
    /// How sales are grouped for the location totals.
    pub location_key: LocationKey,
    /// Pause between consecutive geocode requests.
    pub request_delay: Duration,
}

impl EnrichOptions {
    /// Sets the location grouping.
    #[must_use]
    pub const fn with_location_key(mut self, location_key: LocationKey) -> Self {
        self.location_key = location_key;
        self
    }

    /// Sets the pause between consecutive geocode requests.
    #[must_use]
    pub const fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }
}
