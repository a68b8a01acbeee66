//! The sequential enrichment pass.

use std::sync::Arc;

use pincode_sales_geocoder::Geocoder;
use pincode_sales_models::{AggregateStats, EnrichedRecord, GeocodeOutcome, SalesRecord};

use crate::progress::ProgressCallback;
use crate::{EnrichOptions, MarkerSink};

/// Everything produced by one enrichment pass.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    /// Valid records in input order, with coordinates where found.
    pub records: Vec<EnrichedRecord>,
    /// Totals over every valid record.
    pub stats: AggregateStats,
    /// Rows dropped for missing fields.
    pub invalid: usize,
    /// Records that got a marker.
    pub markers: usize,
    /// Records whose postal code had no match.
    pub not_found: usize,
    /// Records abandoned because the lookup itself failed.
    pub skipped: usize,
}

/// Enriches `records` one at a time, in order.
///
/// For each valid record the quantity is parsed and folded into the
/// aggregates before the lookup, so a record counts towards the totals
/// whether or not it can be placed on the map. A marker is sent to `sink`
/// only when the geocoder returns coordinates. Lookup failures are logged
/// and never stop the pass.
pub async fn run(
    records: Vec<SalesRecord>,
    geocoder: &dyn Geocoder,
    sink: &mut dyn MarkerSink,
    options: &EnrichOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> EnrichmentReport {
    let total_rows = records.len();
    let valid: Vec<SalesRecord> = records.into_iter().filter(SalesRecord::is_valid).collect();

    let mut report = EnrichmentReport {
        records: Vec::with_capacity(valid.len()),
        invalid: total_rows - valid.len(),
        ..EnrichmentReport::default()
    };

    if report.invalid > 0 {
        log::info!(
            "Dropped {} of {total_rows} rows with missing fields",
            report.invalid
        );
    }

    progress.set_total(valid.len() as u64);
    log::info!(
        "Geocoding {} records via {} (delay={:?})...",
        valid.len(),
        geocoder.id(),
        options.request_delay
    );

    for (i, record) in valid.into_iter().enumerate() {
        let quantity = record.quantity();
        report.stats.fold(&record, quantity, options.location_key);

        if i > 0 && !options.request_delay.is_zero() {
            tokio::time::sleep(options.request_delay).await;
        }

        let outcome = geocoder.resolve(&record.postal_code).await;
        let coordinates = outcome.coordinates();

        let enriched = EnrichedRecord {
            record,
            quantity,
            coordinates,
        };

        match outcome {
            GeocodeOutcome::Found { .. } => {
                sink.draw_marker(&enriched);
                report.markers += 1;
            }
            GeocodeOutcome::NotFound => {
                log::warn!(
                    "Could not fetch coordinates for pincode {}. Marker not created.",
                    enriched.record.postal_code
                );
                report.not_found += 1;
            }
            GeocodeOutcome::TransientError { message } => {
                log::error!(
                    "Skipping pincode {} after failed lookup: {message}",
                    enriched.record.postal_code
                );
                report.skipped += 1;
            }
        }

        report.records.push(enriched);
        progress.inc(1);
    }

    progress.finish(format!(
        "Geocoded {} records: {} markers, {} not found, {} skipped",
        report.records.len(),
        report.markers,
        report.not_found,
        report.skipped
    ));

    report
}
