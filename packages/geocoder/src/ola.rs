//! Ola Maps geocode client.
//!
//! Looks up a pincode with `GET {base_url}?address={pincode}&language={language}`
//! and reads the first entry of `geocodingResults`. Requests carry an
//! `Authorization: Bearer` token and, when configured, an `api_key` query
//! parameter.
//!
//! Set `OLA_MAPS_BEARER_TOKEN` (and optionally `OLA_MAPS_API_KEY`) in the
//! environment; see [`credentials_from_env`].

use async_trait::async_trait;
use pincode_sales_models::{Coordinates, GeocodeOutcome};

use crate::service_registry::{GeocodingService, ProviderConfig};
use crate::{GeocodeError, Geocoder};

/// Environment variable holding the bearer token.
pub const BEARER_TOKEN_ENV: &str = "OLA_MAPS_BEARER_TOKEN";
/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OLA_MAPS_API_KEY";

/// Maximum length of an error body preview included in logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Ola Maps credentials read from environment variables.
#[derive(Clone, Default)]
pub struct OlaCredentials {
    /// Sent as `Authorization: Bearer {token}`.
    pub bearer_token: Option<String>,
    /// Sent as the `api_key` query parameter.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for OlaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OlaCredentials")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Reads Ola Maps credentials from `OLA_MAPS_BEARER_TOKEN` and
/// `OLA_MAPS_API_KEY`.
///
/// Empty values count as unset. Returns `None` when neither is set.
#[must_use]
pub fn credentials_from_env() -> Option<OlaCredentials> {
    let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    let bearer_token = read(BEARER_TOKEN_ENV);
    let api_key = read(API_KEY_ENV);

    if bearer_token.is_none() && api_key.is_none() {
        return None;
    }

    Some(OlaCredentials {
        bearer_token,
        api_key,
    })
}

/// Geocodes a single pincode against the Ola Maps geocode endpoint.
///
/// Returns `Ok(None)` when the service answered but had no match with a
/// usable coordinate.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the request fails, the server answers with
/// a non-success status, or the body is not a JSON object.
pub async fn geocode_pincode(
    client: &reqwest::Client,
    base_url: &str,
    language: &str,
    pincode: &str,
    credentials: Option<&OlaCredentials>,
) -> Result<Option<Coordinates>, GeocodeError> {
    let mut req = client
        .get(base_url)
        .query(&[("address", pincode), ("language", language)])
        .header(reqwest::header::ACCEPT, "application/json");

    if let Some(creds) = credentials {
        if let Some(api_key) = &creds.api_key {
            req = req.query(&[("api_key", api_key)]);
        }
        if let Some(token) = &creds.bearer_token {
            req = req.bearer_auth(token);
        }
    }

    let resp = req.send().await?;
    let status = resp.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let preview: String = body.chars().take(BODY_PREVIEW_LEN).collect();
        log::error!("Ola Maps geocode error for pincode {pincode} ({status}): {preview}");
        return Err(GeocodeError::Status { status });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses an Ola Maps geocode response.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinates>, GeocodeError> {
    if !body.is_object() {
        return Err(GeocodeError::Parse {
            message: "Ola Maps response is not a JSON object".to_string(),
        });
    }

    let Some(first) = body
        .get("geocodingResults")
        .and_then(serde_json::Value::as_array)
        .and_then(|results| results.first())
    else {
        return Ok(None);
    };

    let Some(location) = first.pointer("/geometry/location") else {
        return Ok(None);
    };

    let (Some(latitude), Some(longitude)) = (
        location.get("lat").and_then(as_coordinate),
        location.get("lng").and_then(as_coordinate),
    ) else {
        return Ok(None);
    };

    Ok(Some(Coordinates {
        latitude,
        longitude,
    }))
}

/// Reads a coordinate given either as a JSON number or a numeric string.
fn as_coordinate(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|v: &f64| v.is_finite())
}

/// [`Geocoder`] backed by the Ola Maps geocode API.
#[derive(Debug, Clone)]
pub struct OlaMapsGeocoder {
    client: reqwest::Client,
    id: String,
    base_url: String,
    language: String,
    credentials: Option<OlaCredentials>,
}

impl OlaMapsGeocoder {
    /// Creates a geocoder for `base_url`, answering in `language`.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, language: &str) -> Self {
        Self {
            client,
            id: "ola_maps".to_string(),
            base_url: base_url.to_string(),
            language: language.to_string(),
            credentials: None,
        }
    }

    /// Builds a geocoder from a service registry entry.
    #[must_use]
    pub fn from_service(client: reqwest::Client, service: &GeocodingService) -> Self {
        let ProviderConfig::OlaMaps {
            base_url, language, ..
        } = &service.provider;

        let mut geocoder = Self::new(client, base_url, language);
        geocoder.id.clone_from(&service.id);
        geocoder
    }

    /// Attaches credentials to every request.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<OlaCredentials>) -> Self {
        self.credentials = credentials;
        self
    }
}

#[async_trait]
impl Geocoder for OlaMapsGeocoder {
    fn id(&self) -> &str {
        &self.id
    }

    async fn resolve(&self, postal_code: &str) -> GeocodeOutcome {
        match geocode_pincode(
            &self.client,
            &self.base_url,
            &self.language,
            postal_code,
            self.credentials.as_ref(),
        )
        .await
        {
            Ok(Some(coords)) => GeocodeOutcome::Found {
                latitude: coords.latitude,
                longitude: coords.longitude,
            },
            Ok(None) => {
                log::warn!("No coordinates found for pincode {postal_code} from Ola Maps");
                GeocodeOutcome::NotFound
            }
            Err(e) => {
                log::error!("Error fetching coordinates for pincode {postal_code} from Ola Maps: {e}");
                e.into_outcome()
            }
        }
    }
}
