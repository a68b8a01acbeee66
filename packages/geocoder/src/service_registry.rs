//! Compile-time registry of geocoding service configurations.
//!
//! Each geocoding provider is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`].

use serde::Deserialize;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"ola_maps"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be used.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Preference order; lower values are picked first.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Ola Maps geocode API.
    OlaMaps {
        /// Geocode endpoint (e.g., `"https://api.olamaps.io/places/v1/geocode"`).
        base_url: String,
        /// Response language hint sent with every request.
        #[serde(default = "default_language")]
        language: String,
        /// Minimum delay between consecutive requests in milliseconds.
        #[serde(default)]
        rate_limit_ms: u64,
    },
}

const fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "English".to_string()
}

impl GeocodingService {
    /// Returns the provider's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::OlaMaps { base_url, .. } => base_url,
        }
    }

    /// Returns the configured delay between consecutive requests.
    #[must_use]
    pub fn rate_limit_ms(&self) -> u64 {
        match &self.provider {
            ProviderConfig::OlaMaps { rate_limit_ms, .. } => *rate_limit_ms,
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[("ola_maps", include_str!("../services/ola_maps.toml"))];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 1;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut services: Vec<GeocodingService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}

/// Returns the enabled service to use: `id` when given, otherwise the
/// highest-priority one.
#[must_use]
pub fn select_service(id: Option<&str>) -> Option<GeocodingService> {
    let services = enabled_services();
    match id {
        Some(id) => services.into_iter().find(|s| s.id == id),
        None => services.into_iter().next(),
    }
}
