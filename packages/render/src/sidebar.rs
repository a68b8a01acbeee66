//! Sidebar statistics derived from the aggregates of one load.

use std::fmt::Write as _;

use pincode_sales_models::AggregateStats;
use serde::Serialize;

/// Number of locations listed under "Top Locations".
pub const TOP_LOCATIONS: usize = 5;

/// Sales of one device category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceBreakdown {
    /// Device category label.
    pub device: String,
    /// Units sold in this category.
    pub quantity: u64,
    /// Share of the total, one decimal place (e.g. `"42.9"`).
    pub percentage: String,
}

/// Sales at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationTotal {
    /// City, or `City,State` when grouped by both.
    pub location: String,
    /// Units sold at this location.
    pub quantity: u64,
}

/// Everything shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarStats {
    /// Units sold across all valid rows.
    pub total_quantity: u64,
    /// Distinct pincodes seen.
    pub unique_postal_codes: usize,
    /// Distinct states seen.
    pub unique_states: usize,
    /// In the order each device first appeared.
    pub devices: Vec<DeviceBreakdown>,
    /// Highest totals first; equal totals keep first-seen order.
    pub top_locations: Vec<LocationTotal>,
}

impl SidebarStats {
    /// Builds the sidebar from the aggregates of a finished load.
    #[must_use]
    pub fn from_stats(stats: &AggregateStats) -> Self {
        let devices = stats
            .device_totals
            .iter()
            .map(|(device, quantity)| DeviceBreakdown {
                device: device.to_string(),
                quantity,
                percentage: format_percentage(quantity, stats.total_quantity),
            })
            .collect();

        let mut locations: Vec<LocationTotal> = stats
            .location_totals
            .iter()
            .map(|(location, quantity)| LocationTotal {
                location: location.to_string(),
                quantity,
            })
            .collect();
        // Stable, so ties stay in insertion order.
        locations.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        locations.truncate(TOP_LOCATIONS);

        Self {
            total_quantity: stats.total_quantity,
            unique_postal_codes: stats.unique_postal_code_count(),
            unique_states: stats.unique_state_count(),
            devices,
            top_locations: locations,
        }
    }

    /// Plain-text rendering for terminals.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total Devices Sold: {}", self.total_quantity);
        let _ = writeln!(out, "Unique Pin Codes: {}", self.unique_postal_codes);
        let _ = writeln!(out, "States Covered: {}", self.unique_states);

        let _ = writeln!(out, "\nDevice Breakdown");
        for d in &self.devices {
            let _ = writeln!(out, "  {}: {} ({}%)", d.device, d.quantity, d.percentage);
        }

        let _ = writeln!(out, "\nTop Locations");
        for l in &self.top_locations {
            let _ = writeln!(out, "  {}: {} devices", l.location, l.quantity);
        }

        out
    }
}

/// `part / total * 100` to one decimal place, halves rounded up.
/// An empty total yields `"0.0"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_percentage(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    let pct = part as f64 / total as f64 * 100.0;
    format!("{:.1}", (pct * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use pincode_sales_models::{DeviceCategory, LocationKey, SalesRecord};

    use super::*;

    fn stats(rows: &[(&str, &str, &str, &str, u64)]) -> AggregateStats {
        let mut stats = AggregateStats::default();
        for (postal, city, state, device, quantity) in rows {
            let record = SalesRecord {
                postal_code: (*postal).to_string(),
                city: (*city).to_string(),
                state: (*state).to_string(),
                device_category: DeviceCategory::from_label(device),
                quantity_sold: quantity.to_string(),
            };
            stats.fold(&record, *quantity, LocationKey::City);
        }
        stats
    }

    #[test]
    fn percentages_sum_to_roughly_one_hundred() {
        let sidebar = SidebarStats::from_stats(&stats(&[
            ("1", "A", "X", "Smartphone", 1),
            ("2", "B", "X", "Tablet", 1),
            ("3", "C", "Y", "Laptop", 1),
        ]));

        let sum: f64 = sidebar
            .devices
            .iter()
            .map(|d| d.percentage.parse::<f64>().unwrap())
            .sum();
        assert!((sum - 100.0).abs() <= 0.05 * sidebar.devices.len() as f64 + 1e-9);
        assert_eq!(sidebar.devices[0].percentage, "33.3");
    }

    #[test]
    fn device_breakdown_keeps_first_seen_order() {
        let sidebar = SidebarStats::from_stats(&stats(&[
            ("1", "A", "X", "Tablet", 3),
            ("2", "B", "X", "Smartphone", 7),
            ("3", "C", "Y", "Tablet", 1),
        ]));

        let devices: Vec<_> = sidebar.devices.iter().map(|d| d.device.as_str()).collect();
        assert_eq!(devices, vec!["Tablet", "Smartphone"]);
        assert_eq!(sidebar.devices[0].quantity, 4);
        assert_eq!(sidebar.devices[0].percentage, "36.4");
        assert_eq!(sidebar.devices[1].percentage, "63.6");
    }

    #[test]
    fn zero_total_gives_zero_percent() {
        let sidebar = SidebarStats::from_stats(&stats(&[("1", "A", "X", "Laptop", 0)]));
        assert_eq!(sidebar.total_quantity, 0);
        assert_eq!(sidebar.devices[0].percentage, "0.0");
        assert_eq!(format_percentage(0, 0), "0.0");
    }

    #[test]
    fn top_locations_are_stable_on_ties() {
        let sidebar = SidebarStats::from_stats(&stats(&[
            ("1", "A", "X", "Laptop", 10),
            ("2", "B", "X", "Laptop", 10),
            ("3", "C", "X", "Laptop", 5),
        ]));

        let order: Vec<_> = sidebar
            .top_locations
            .iter()
            .map(|l| l.location.as_str())
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn top_locations_keeps_five_highest() {
        let sidebar = SidebarStats::from_stats(&stats(&[
            ("1", "A", "X", "Laptop", 1),
            ("2", "B", "X", "Laptop", 6),
            ("3", "C", "X", "Laptop", 2),
            ("4", "D", "X", "Laptop", 5),
            ("5", "E", "X", "Laptop", 3),
            ("6", "F", "X", "Laptop", 4),
            ("7", "A", "X", "Laptop", 9),
        ]));

        let order: Vec<_> = sidebar
            .top_locations
            .iter()
            .map(|l| (l.location.as_str(), l.quantity))
            .collect();
        assert_eq!(
            order,
            vec![("A", 10), ("B", 6), ("D", 5), ("F", 4), ("E", 3)]
        );
    }

    #[test]
    fn counts_and_text() {
        let sidebar = SidebarStats::from_stats(&stats(&[
            ("560001", "Bengaluru", "Karnataka", "Smartphone", 5),
            ("570001", "Mysuru", "Karnataka", "Tablet", 3),
            ("110001", "Delhi", "Delhi", "Smartphone", 2),
        ]));

        assert_eq!(sidebar.total_quantity, 10);
        assert_eq!(sidebar.unique_postal_codes, 3);
        assert_eq!(sidebar.unique_states, 2);

        let text = sidebar.to_text();
        assert!(text.contains("Total Devices Sold: 10"));
        assert!(text.contains("Smartphone: 7 (70.0%)"));
        assert!(text.contains("Bengaluru: 5 devices"));
    }
}
