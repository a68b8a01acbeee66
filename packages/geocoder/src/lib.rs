#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pincode geocoding.
//!
//! Resolves Indian postal codes to latitude/longitude through the Ola Maps
//! geocode API. Provider settings live in TOML files under `services/`
//! and are loaded by the [`service_registry`]; credentials come from the
//! environment (see [`ola::credentials_from_env`]).
//!
//! The [`Geocoder`] trait is total: every lookup ends in a
//! [`GeocodeOutcome`], never an error. Each call issues exactly one HTTP
//! request with no retry and no caching; pacing between calls is the
//! caller's job (see `rate_limit_ms` in the service TOML configuration).

pub mod ola;
pub mod service_registry;

use async_trait::async_trait;
use pincode_sales_models::GeocodeOutcome;
use thiserror::Error;

pub use ola::{OlaCredentials, OlaMapsGeocoder};

/// Errors from a single geocoding request.
///
/// These never escape [`Geocoder::resolve`]; they are folded into a
/// [`GeocodeOutcome`] there.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("service returned status {status}")]
    Status {
        /// Status code returned.
        status: reqwest::StatusCode,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

impl GeocodeError {
    /// Folds a request failure into a lookup outcome.
    ///
    /// A plain error status means the service had nothing for us and maps
    /// to [`GeocodeOutcome::NotFound`]. Transport failures, undecodable
    /// bodies, and rate limiting map to
    /// [`GeocodeOutcome::TransientError`].
    #[must_use]
    pub fn into_outcome(self) -> GeocodeOutcome {
        match self {
            Self::Status { .. } => GeocodeOutcome::NotFound,
            Self::Http(_) | Self::Parse { .. } | Self::RateLimited => {
                GeocodeOutcome::TransientError {
                    message: self.to_string(),
                }
            }
        }
    }
}

/// A service that resolves postal codes to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Short identifier of the backing service (e.g., `"ola_maps"`).
    fn id(&self) -> &str;

    /// Looks up `postal_code`.
    ///
    /// Always resolves: failures are reported as
    /// [`GeocodeOutcome::NotFound`] or [`GeocodeOutcome::TransientError`]
    /// and logged.
    async fn resolve(&self, postal_code: &str) -> GeocodeOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_is_not_found() {
        let err = GeocodeError::Status {
            status: reqwest::StatusCode::BAD_REQUEST,
        };
        assert_eq!(err.into_outcome(), GeocodeOutcome::NotFound);
    }

    #[test]
    fn rate_limit_is_transient() {
        assert_eq!(
            GeocodeError::RateLimited.into_outcome(),
            GeocodeOutcome::TransientError {
                message: "Rate limit exceeded".to_string()
            }
        );
    }

    #[test]
    fn parse_failure_is_transient() {
        let outcome = GeocodeError::Parse {
            message: "body is not an object".to_string(),
        }
        .into_outcome();
        assert!(matches!(outcome, GeocodeOutcome::TransientError { .. }));
    }
}
