//! One complete load: read the CSV, enrich it, hand back the results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pincode_sales_geocoder::Geocoder;
use pincode_sales_loader::{CsvLoader, DataSource, LoadError, LoaderError, ParseError};
use thiserror::Error;

use crate::engine::{self, EnrichmentReport};
use crate::progress::ProgressCallback;
use crate::{EnrichOptions, MarkerSink};

/// A load that ended before enrichment started.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The CSV could not be retrieved.
    #[error("Error loading CSV: {0}")]
    Load(#[from] LoadError),

    /// The CSV could not be parsed.
    #[error("Error parsing CSV: {0}")]
    Parse(#[from] ParseError),
}

impl From<LoaderError> for SessionError {
    fn from(value: LoaderError) -> Self {
        match value {
            LoaderError::Load(e) => Self::Load(e),
            LoaderError::Parse(e) => Self::Parse(e),
        }
    }
}

/// Result of a finished load.
#[derive(Debug, Clone)]
pub struct SessionOutput {
    /// Where the CSV came from.
    pub source: DataSource,
    /// Data rows in the CSV, valid or not.
    pub rows: usize,
    /// Enrichment results and aggregates.
    pub report: EnrichmentReport,
    /// Wall-clock time of the whole load.
    pub elapsed: Duration,
}

/// Owns the state of a single load from start to finish.
///
/// A session is consumed by [`LoadSession::run`]; start a new one for
/// every load so no totals leak between loads.
#[derive(Debug, Clone)]
pub struct LoadSession {
    loader: CsvLoader,
    options: EnrichOptions,
}

impl LoadSession {
    /// Creates a session that reads with `loader` and enriches with
    /// `options`.
    #[must_use]
    pub const fn new(loader: CsvLoader, options: EnrichOptions) -> Self {
        Self { loader, options }
    }

    /// Loads `source` and enriches every valid row, sending markers to
    /// `sink`.
    ///
    /// Nothing reaches `sink` unless the CSV was loaded and parsed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Load`] if the CSV cannot be retrieved and
    /// [`SessionError::Parse`] if it is malformed.
    pub async fn run(
        self,
        source: &DataSource,
        geocoder: &dyn Geocoder,
        sink: &mut dyn MarkerSink,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<SessionOutput, SessionError> {
        let start = Instant::now();

        progress.set_message(format!("Loading {source}"));
        let rows = self.loader.load(source).await?;

        let records = rows.iter().map(pincode_sales_loader::CsvRow::to_sales_record).collect();

        progress.set_message("Geocoding pincodes".to_string());
        let report = engine::run(records, geocoder, sink, &self.options, progress).await;

        let elapsed = start.elapsed();
        log::info!(
            "Load of {source} complete: {} rows, {} valid, {} markers in {:.1}s",
            rows.len(),
            report.records.len(),
            report.markers,
            elapsed.as_secs_f64()
        );

        Ok(SessionOutput {
            source: source.clone(),
            rows: rows.len(),
            report,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pincode_sales_models::EnrichedRecord;

    use super::*;
    use crate::progress::null_progress;
    use crate::testing::{ScriptedGeocoder, found};

    async fn write_temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pincode_sales_session_{name}_{}.csv",
            std::process::id()
        ));
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn runs_a_full_load() {
        let path = write_temp_csv(
            "full",
            "pincode,city,state,device_type,quantity_sold\n\
             P1,Bengaluru,Karnataka,Smartphone,5\n\
             P2,Mysuru,Karnataka,Tablet,3\n\
             ,Nowhere,Nowhere,Laptop,9\n\
             P3,Delhi,Delhi,Laptop,2\n",
        )
        .await;
        let geocoder = ScriptedGeocoder::new(&[("P1", found(12.0, 77.0)), ("P3", found(28.0, 77.0))]);
        let mut markers: Vec<EnrichedRecord> = Vec::new();

        let output = LoadSession::new(CsvLoader::new(), EnrichOptions::default())
            .run(
                &DataSource::Path(path.clone()),
                &geocoder,
                &mut markers,
                &null_progress(),
            )
            .await
            .unwrap();
        tokio::fs::remove_file(&path).await.ok();

        assert_eq!(output.rows, 4);
        assert_eq!(output.report.invalid, 1);
        assert_eq!(output.report.stats.total_quantity, 10);
        assert_eq!(output.report.stats.unique_postal_code_count(), 3);
        assert_eq!(markers.len(), 2);
    }

    #[tokio::test]
    async fn missing_header_is_a_parse_error_with_no_markers() {
        let path = write_temp_csv(
            "headerless",
            "P1,Bengaluru,Karnataka,Smartphone,5\nP2,Mysuru,Karnataka,Tablet,3\n",
        )
        .await;
        let geocoder = ScriptedGeocoder::new(&[("P2", found(1.0, 1.0))]);
        let mut markers: Vec<EnrichedRecord> = Vec::new();

        let err = LoadSession::new(CsvLoader::new(), EnrichOptions::default())
            .run(
                &DataSource::Path(path.clone()),
                &geocoder,
                &mut markers,
                &null_progress(),
            )
            .await
            .unwrap_err();
        tokio::fs::remove_file(&path).await.ok();

        assert!(matches!(err, SessionError::Parse(_)));
        assert!(err.to_string().starts_with("Error parsing CSV:"));
        assert!(markers.is_empty());
        assert!(geocoder.calls().is_empty());
    }

    #[tokio::test]
    async fn unreadable_source_is_a_load_error() {
        let geocoder = ScriptedGeocoder::new(&[]);
        let mut markers: Vec<EnrichedRecord> = Vec::new();

        let err = LoadSession::new(CsvLoader::new(), EnrichOptions::default())
            .run(
                &DataSource::Path(PathBuf::from("/nonexistent/sales_data.csv")),
                &geocoder,
                &mut markers,
                &null_progress(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Load(_)));
        assert!(err.to_string().starts_with("Error loading CSV:"));
    }
}
