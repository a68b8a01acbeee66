//! Map markers for geocoded sales records.

use pincode_sales_enrich::MarkerSink;
use pincode_sales_models::{DeviceCategory, EnrichedRecord};
use serde::Serialize;

use crate::html::escape;

/// Smallest marker radius, in pixels.
pub const MIN_RADIUS: f64 = 5.0;
/// Largest marker radius, in pixels.
pub const MAX_RADIUS: f64 = 15.0;
/// Units sold per extra pixel of radius.
const UNITS_PER_PIXEL: f64 = 20.0;

/// Fill color for devices without an assigned color.
pub const FALLBACK_COLOR: &str = "#999";

/// A circle marker ready to be drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Latitude of the center.
    pub latitude: f64,
    /// Longitude of the center.
    pub longitude: f64,
    /// Radius in pixels.
    pub radius: f64,
    /// Fill color (CSS hex).
    pub fill_color: &'static str,
    /// Outline color (CSS hex).
    pub stroke_color: &'static str,
    /// Outline width in pixels.
    pub weight: f64,
    /// Outline opacity.
    pub opacity: f64,
    /// Fill opacity.
    pub fill_opacity: f64,
    /// Device label, for legends and filtering.
    pub device: String,
    /// Parsed quantity sold.
    pub quantity: u64,
    /// Popup body (HTML, already escaped).
    pub popup: String,
}

impl Marker {
    /// Builds the marker for `record`, or `None` if it was not geocoded.
    #[must_use]
    pub fn from_record(record: &EnrichedRecord) -> Option<Self> {
        let coords = record.coordinates?;
        let device = &record.record.device_category;

        Some(Self {
            latitude: coords.latitude,
            longitude: coords.longitude,
            radius: marker_radius(record.quantity),
            fill_color: device_color(device),
            stroke_color: "#fff",
            weight: 1.0,
            opacity: 1.0,
            fill_opacity: 0.8,
            device: device.as_str().to_string(),
            quantity: record.quantity,
            popup: popup_html(record),
        })
    }
}

/// Radius for a marker selling `quantity` units: grows by one pixel per
/// 20 units from [`MIN_RADIUS`] and stops at [`MAX_RADIUS`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn marker_radius(quantity: u64) -> f64 {
    (MIN_RADIUS + quantity as f64 / UNITS_PER_PIXEL).clamp(MIN_RADIUS, MAX_RADIUS)
}

/// Fill color for a device category.
#[must_use]
pub const fn device_color(device: &DeviceCategory) -> &'static str {
    match device {
        DeviceCategory::Smartphone => "#4285F4",
        DeviceCategory::Tablet => "#EA4335",
        DeviceCategory::Laptop => "#34A853",
        DeviceCategory::Other(_) => FALLBACK_COLOR,
    }
}

/// Popup summary: city, state, postal code, device and quantity as
/// written in the source data.
fn popup_html(record: &EnrichedRecord) -> String {
    let r = &record.record;
    format!(
        "<strong>{}, {}</strong><br>Pin Code: {}<br>Device: {}<br>Quantity Sold: {}",
        escape(&r.city),
        escape(&r.state),
        escape(&r.postal_code),
        escape(r.device_category.as_str()),
        escape(&r.quantity_sold),
    )
}

/// Collects markers as the enrichment pass emits them.
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
}

impl MarkerLayer {
    /// Creates an empty layer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            markers: Vec::new(),
        }
    }

    /// Markers in the order they were drawn.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Number of markers drawn.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if no marker was drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl MarkerSink for MarkerLayer {
    fn draw_marker(&mut self, record: &EnrichedRecord) {
        if let Some(marker) = Marker::from_record(record) {
            self.markers.push(marker);
        } else {
            log::warn!(
                "Ignoring marker for pincode {} without coordinates",
                record.record.postal_code
            );
        }
    }
}
