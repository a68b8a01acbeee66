#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presentation of an enriched sales load.
//!
//! [`MarkerLayer`] collects a [`Marker`] for every geocoded record as the
//! enrichment pass runs. Once the pass is done, [`SidebarStats`] is built
//! from the aggregates and [`write_outputs`] writes:
//!
//! - `markers.geojson`: a `FeatureCollection` of marker points
//! - `stats.json`: the sidebar statistics
//! - `index.html`: a Leaflet page embedding both

pub mod html;
pub mod marker;
pub mod sidebar;

use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use thiserror::Error;

pub use marker::{Marker, MarkerLayer, device_color, marker_radius};
pub use sidebar::{DeviceBreakdown, LocationTotal, SidebarStats};

/// File name of the marker `FeatureCollection`.
pub const MARKERS_FILE: &str = "markers.geojson";
/// File name of the sidebar statistics.
pub const STATS_FILE: &str = "stats.json";
/// File name of the map page.
pub const PAGE_FILE: &str = "index.html";

/// Errors writing output files.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Writing `path` failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Files written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Path of `markers.geojson`.
    pub markers: PathBuf,
    /// Path of `stats.json`.
    pub stats: PathBuf,
    /// Path of `index.html`.
    pub page: PathBuf,
}

/// Converts markers to a `GeoJSON` `FeatureCollection` of points. Every
/// marker field except the position becomes a feature property.
#[must_use]
pub fn to_feature_collection(markers: &[Marker]) -> FeatureCollection {
    let features = markers
        .iter()
        .map(|m| {
            let mut properties = JsonObject::new();
            properties.insert("radius".to_string(), m.radius.into());
            properties.insert("fill_color".to_string(), m.fill_color.into());
            properties.insert("stroke_color".to_string(), m.stroke_color.into());
            properties.insert("weight".to_string(), m.weight.into());
            properties.insert("opacity".to_string(), m.opacity.into());
            properties.insert("fill_opacity".to_string(), m.fill_opacity.into());
            properties.insert("device".to_string(), m.device.clone().into());
            properties.insert("quantity".to_string(), m.quantity.into());
            properties.insert("popup".to_string(), m.popup.clone().into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![m.longitude, m.latitude]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Serializes the markers as `GeoJSON`.
///
/// # Errors
///
/// * If serialization fails
pub fn markers_geojson(markers: &[Marker]) -> Result<String, RenderError> {
    Ok(serde_json::to_string(&to_feature_collection(markers))?)
}

/// Renders the full map page for a finished load.
///
/// # Errors
///
/// * If the markers fail to serialize
pub fn page(markers: &[Marker], stats: &SidebarStats) -> Result<String, RenderError> {
    Ok(html::render_page(&markers_geojson(markers)?, stats))
}

/// Writes `markers.geojson`, `stats.json` and `index.html` into `dir`,
/// creating it if needed.
///
/// # Errors
///
/// * If serialization fails
/// * If `dir` or any file cannot be written
pub fn write_outputs(
    dir: &Path,
    layer: &MarkerLayer,
    stats: &SidebarStats,
) -> Result<OutputPaths, RenderError> {
    create_dir(dir)?;

    let geojson = serde_json::to_string_pretty(&to_feature_collection(layer.markers()))?;
    let paths = OutputPaths {
        markers: dir.join(MARKERS_FILE),
        stats: dir.join(STATS_FILE),
        page: dir.join(PAGE_FILE),
    };

    write_file(&paths.markers, &geojson)?;
    write_file(&paths.stats, &serde_json::to_string_pretty(stats)?)?;
    write_file(&paths.page, &page(layer.markers(), stats)?)?;

    log::info!("Wrote {} markers to {}", layer.len(), dir.display());

    Ok(paths)
}

/// Writes an `index.html` into `dir` that shows only `message`.
///
/// # Errors
///
/// * If `dir` or the page cannot be written
pub fn write_error_page(dir: &Path, message: &str) -> Result<PathBuf, RenderError> {
    create_dir(dir)?;
    let path = dir.join(PAGE_FILE);
    write_file(&path, &html::render_error_page(message))?;
    Ok(path)
}

fn create_dir(dir: &Path) -> Result<(), RenderError> {
    std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.display().to_string(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), RenderError> {
    std::fs::write(path, contents).map_err(|source| RenderError::Io {
        path: path.display().to_string(),
        source,
    })
}
