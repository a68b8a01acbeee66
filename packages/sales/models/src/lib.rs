#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core types for the pincode sales map.
//!
//! A [`SalesRecord`] is one row of the sales CSV. Rows that pass
//! [`SalesRecord::is_valid`] are folded into [`AggregateStats`] and
//! geocoded; the geocoder answers with a [`GeocodeOutcome`], and the
//! result of a single row's trip through the pipeline is an
//! [`EnrichedRecord`].

pub mod stats;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub use stats::{AggregateStats, OrderedTotals};

/// CSV column holding the postal code.
pub const COLUMN_POSTAL_CODE: &str = "pincode";
/// CSV column holding the city name.
pub const COLUMN_CITY: &str = "city";
/// CSV column holding the state name.
pub const COLUMN_STATE: &str = "state";
/// CSV column holding the device category.
pub const COLUMN_DEVICE_TYPE: &str = "device_type";
/// CSV column holding the quantity sold.
pub const COLUMN_QUANTITY_SOLD: &str = "quantity_sold";

/// Columns that must be present in the CSV header row.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COLUMN_POSTAL_CODE,
    COLUMN_CITY,
    COLUMN_STATE,
    COLUMN_DEVICE_TYPE,
    COLUMN_QUANTITY_SOLD,
];

/// Kind of device sold.
///
/// The set is open: any label that is not one of the known kinds is kept
/// verbatim in [`DeviceCategory::Other`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumString)]
#[serde(from = "String", into = "String")]
pub enum DeviceCategory {
    /// Mobile phones.
    Smartphone,
    /// Tablets.
    Tablet,
    /// Laptops.
    Laptop,
    /// Any other device label, as written in the source data.
    #[strum(default)]
    Other(String),
}

impl DeviceCategory {
    /// Returns the label used in the source data.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Smartphone => "Smartphone",
            Self::Tablet => "Tablet",
            Self::Laptop => "Laptop",
            Self::Other(label) => label,
        }
    }

    /// Maps a source label to a category, falling back to
    /// [`DeviceCategory::Other`] for unknown labels.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label
            .parse()
            .unwrap_or_else(|_| Self::Other(label.to_string()))
    }

    /// Returns all known (non-`Other`) device categories.
    #[must_use]
    pub const fn known() -> &'static [Self] {
        &[Self::Smartphone, Self::Tablet, Self::Laptop]
    }
}

impl std::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DeviceCategory {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<DeviceCategory> for String {
    fn from(value: DeviceCategory) -> Self {
        match value {
            DeviceCategory::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// How sales are grouped into locations for the top-locations ranking.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LocationKey {
    /// Group by city name only.
    #[default]
    City,
    /// Group by `"{city},{state}"`, so same-named cities in different
    /// states are kept apart.
    CityState,
}

/// One row of the sales CSV.
///
/// Fields hold the trimmed text from the file; an empty string means the
/// column was missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Postal code (pincode) of the sale.
    pub postal_code: String,
    /// City name.
    pub city: String,
    /// State name.
    pub state: String,
    /// Device category.
    pub device_category: DeviceCategory,
    /// Quantity sold, as written in the source data.
    pub quantity_sold: String,
}

impl SalesRecord {
    /// Returns `true` when every required field is non-empty.
    ///
    /// Invalid records never contribute to aggregates or markers.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [
            self.postal_code.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.device_category.as_str(),
            self.quantity_sold.as_str(),
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// Parses [`Self::quantity_sold`] with [`parse_quantity`].
    #[must_use]
    pub fn quantity(&self) -> u64 {
        parse_quantity(&self.quantity_sold)
    }

    /// Returns the key this record's sales are grouped under.
    #[must_use]
    pub fn location_key(&self, key: LocationKey) -> String {
        match key {
            LocationKey::City => self.city.clone(),
            LocationKey::CityState => format!("{},{}", self.city, self.state),
        }
    }
}

/// Parses a quantity the way a lenient integer prefix parser would.
///
/// Leading whitespace and a single `+` sign are skipped, then the longest
/// run of ASCII digits is read. Anything else (no digits, a minus sign,
/// overflow) yields 0.
#[must_use]
pub fn parse_quantity(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    unsigned[..digits_end].parse().unwrap_or(0)
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Result of one geocode lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GeocodeOutcome {
    /// The postal code resolved to a coordinate.
    Found {
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
    },
    /// The service answered but had no usable match.
    NotFound,
    /// The lookup itself failed (transport error, undecodable body, rate
    /// limit).
    TransientError {
        /// Description of the failure.
        message: String,
    },
}

impl GeocodeOutcome {
    /// Returns the coordinates when the lookup succeeded.
    #[must_use]
    pub const fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Found {
                latitude,
                longitude,
            } => Some(Coordinates {
                latitude: *latitude,
                longitude: *longitude,
            }),
            Self::NotFound | Self::TransientError { .. } => None,
        }
    }
}

/// A valid record after its geocode lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// The source record.
    pub record: SalesRecord,
    /// Parsed quantity sold.
    pub quantity: u64,
    /// Resolved position, present only when geocoding succeeded.
    pub coordinates: Option<Coordinates>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quantity: &str) -> SalesRecord {
        SalesRecord {
            postal_code: "560001".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            device_category: DeviceCategory::Smartphone,
            quantity_sold: quantity.to_string(),
        }
    }

    #[test]
    fn parses_quantity_prefix() {
        assert_eq!(parse_quantity("12"), 12);
        assert_eq!(parse_quantity("  7 units"), 7);
        assert_eq!(parse_quantity("+9"), 9);
        assert_eq!(parse_quantity("3.9"), 3);
        assert_eq!(parse_quantity("0"), 0);
    }

    #[test]
    fn unparsable_quantity_is_zero() {
        assert_eq!(parse_quantity("abc"), 0);
        assert_eq!(parse_quantity("-4"), 0);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("99999999999999999999999"), 0);
    }

    #[test]
    fn record_with_all_fields_is_valid() {
        assert!(record("5").is_valid());
        // "0" is present, so the row still counts.
        assert!(record("0").is_valid());
        assert!(record("n/a").is_valid());
    }

    #[test]
    fn record_with_blank_field_is_invalid() {
        assert!(!record("").is_valid());
        assert!(!record("   ").is_valid());

        let mut missing_city = record("5");
        missing_city.city = String::new();
        assert!(!missing_city.is_valid());

        let mut missing_device = record("5");
        missing_device.device_category = DeviceCategory::from_label("");
        assert!(!missing_device.is_valid());
    }

    #[test]
    fn device_category_keeps_unknown_labels() {
        assert_eq!(DeviceCategory::from_label("Tablet"), DeviceCategory::Tablet);
        assert_eq!(
            DeviceCategory::from_label("Smartwatch"),
            DeviceCategory::Other("Smartwatch".to_string())
        );
        assert_eq!(DeviceCategory::from_label("Smartwatch").to_string(), "Smartwatch");
        // Labels are case-sensitive.
        assert_eq!(
            DeviceCategory::from_label("laptop"),
            DeviceCategory::Other("laptop".to_string())
        );
    }

    #[test]
    fn device_category_serializes_as_label() {
        let json = serde_json::to_string(&DeviceCategory::Laptop).unwrap();
        assert_eq!(json, "\"Laptop\"");
        let parsed: DeviceCategory = serde_json::from_str("\"Drone\"").unwrap();
        assert_eq!(parsed, DeviceCategory::Other("Drone".to_string()));
    }

    #[test]
    fn location_key_modes() {
        let rec = record("1");
        assert_eq!(rec.location_key(LocationKey::City), "Bengaluru");
        assert_eq!(rec.location_key(LocationKey::CityState), "Bengaluru,Karnataka");
        assert_eq!("city-state".parse::<LocationKey>().unwrap(), LocationKey::CityState);
        assert_eq!(LocationKey::City.to_string(), "city");
    }

    #[test]
    fn outcome_coordinates() {
        let found = GeocodeOutcome::Found {
            latitude: 12.0,
            longitude: 77.0,
        };
        assert_eq!(
            found.coordinates(),
            Some(Coordinates {
                latitude: 12.0,
                longitude: 77.0
            })
        );
        assert!(GeocodeOutcome::NotFound.coordinates().is_none());
        assert!(
            GeocodeOutcome::TransientError {
                message: "timeout".to_string()
            }
            .coordinates()
            .is_none()
        );
    }
}
