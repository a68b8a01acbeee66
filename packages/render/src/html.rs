//! Self-contained Leaflet page for the sales map.

use std::fmt::Write as _;

use crate::sidebar::SidebarStats;

/// Initial map center (India).
const MAP_CENTER: (f64, f64) = (22.3511, 78.6677);
const MAP_ZOOM: u8 = 5;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

const STYLE: &str = r"
  body { margin: 0; font-family: sans-serif; display: flex; height: 100vh; }
  #map { flex: 1; }
  #sidebar { width: 320px; padding: 16px; overflow-y: auto; background: #f7f7f7; }
  #sidebar h2 { margin-top: 0; }
  .stat { margin-bottom: 8px; }
  .stat .value { font-weight: bold; }
  .error-message { margin: auto; padding: 24px; color: #b00020; font-size: 1.1em; }
";

/// Escapes text for use in HTML content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Makes serialized JSON safe to place inside a `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Renders the map page. `markers_geojson` is the serialized marker
/// `FeatureCollection`.
#[must_use]
pub fn render_page(markers_geojson: &str, stats: &SidebarStats) -> String {
    let (lat, lng) = MAP_CENTER;
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Pincode Sales Map</title>
<link rel="stylesheet" href="{LEAFLET_CSS}">
<style>{STYLE}</style>
</head>
<body>
<div id="map"></div>
<div id="sidebar">
{sidebar}</div>
<script src="{LEAFLET_JS}"></script>
<script>
const markers = {markers};
const map = L.map('map').setView([{lat}, {lng}], {MAP_ZOOM});
L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
  attribution: '&copy; OpenStreetMap contributors'
}}).addTo(map);
for (const feature of markers.features) {{
  const [lng, lat] = feature.geometry.coordinates;
  const p = feature.properties;
  L.circleMarker([lat, lng], {{
    radius: p.radius,
    fillColor: p.fill_color,
    color: p.stroke_color,
    weight: p.weight,
    opacity: p.opacity,
    fillOpacity: p.fill_opacity
  }}).addTo(map).bindPopup(p.popup);
}}
</script>
</body>
</html>
"#,
        sidebar = render_sidebar(stats),
        markers = script_safe(markers_geojson),
    )
}

/// Renders a page showing `message` where the map would be.
#[must_use]
pub fn render_error_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Pincode Sales Map</title>
<style>{STYLE}</style>
</head>
<body>
<div class="error-message">{}</div>
</body>
</html>
"#,
        escape(message)
    )
}

fn render_sidebar(stats: &SidebarStats) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "<h2>Sales Overview</h2>");
    for (label, value) in [
        ("Total Devices Sold", stats.total_quantity.to_string()),
        ("Unique Pin Codes", stats.unique_postal_codes.to_string()),
        ("States Covered", stats.unique_states.to_string()),
    ] {
        let _ = writeln!(
            out,
            r#"<div class="stat">{label}: <span class="value">{value}</span></div>"#
        );
    }

    let _ = writeln!(out, "<h3>Device Breakdown</h3>");
    for d in &stats.devices {
        let _ = writeln!(
            out,
            r#"<div class="stat">{}: <span class="value">{} ({}%)</span></div>"#,
            escape(&d.device),
            d.quantity,
            d.percentage
        );
    }

    let _ = writeln!(out, "<h3>Top Locations</h3>");
    for l in &stats.top_locations {
        let _ = writeln!(
            out,
            r#"<div class="stat">{}: <span class="value">{} devices</span></div>"#,
            escape(&l.location),
            l.quantity
        );
    }

    out
}
