#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sales CSV loader.
//!
//! Reads a CSV file from disk or downloads it over HTTP, checks that the
//! header row carries every column in
//! [`pincode_sales_models::REQUIRED_COLUMNS`], and returns each data row
//! as a [`CsvRow`] in file order.
//!
//! Failures are split into [`LoadError`] (the bytes could not be
//! retrieved) and [`ParseError`] (the bytes are not a usable sales
//! table). Both end the load.

pub mod row;

use std::path::PathBuf;

use pincode_sales_models::REQUIRED_COLUMNS;
use thiserror::Error;

pub use row::CsvRow;

/// The sales data could not be retrieved.
#[derive(Debug, Error)]
pub enum LoadError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status {
        /// URL that was requested.
        url: String,
        /// Status code returned.
        status: reqwest::StatusCode,
    },

    /// Reading a local file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// The sales data was retrieved but is not a usable table.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input has no header row.
    #[error("CSV file contains no header row")]
    NoHeader,

    /// The header row lacks required columns.
    #[error("CSV header is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        /// Names of the absent columns.
        columns: Vec<String>,
    },

    /// The CSV reader rejected the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Either half of a failed load.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Retrieval failed.
    #[error("Error loading CSV: {0}")]
    Load(#[from] LoadError),

    /// Parsing failed.
    #[error("Error parsing CSV: {0}")]
    Parse(#[from] ParseError),
}

/// Where the sales CSV lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl DataSource {
    /// Interprets `value` as a URL when it has an HTTP scheme, otherwise as
    /// a filesystem path.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }
}

impl std::str::FromStr for DataSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Loader for sales CSV files.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    /// HTTP client used for URL sources.
    client: Option<reqwest::Client>,
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvLoader {
    /// Creates a comma-delimited loader that builds its own HTTP client.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            client: None,
            delimiter: b',',
        }
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Uses `client` for downloads instead of building one.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Retrieves and parses the CSV at `source`.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Load`] if the data cannot be retrieved and
    /// [`LoaderError::Parse`] if it is not a valid sales table.
    pub async fn load(&self, source: &DataSource) -> Result<Vec<CsvRow>, LoaderError> {
        let bytes = self.fetch(source).await?;
        log::debug!("Read {} bytes from {source}", bytes.len());

        let rows = self.parse(&bytes)?;
        log::info!("Parsed {} rows from {source}", rows.len());

        Ok(rows)
    }

    /// Retrieves the raw bytes at `source`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] on I/O failure, transport failure, or a
    /// non-success HTTP status.
    pub async fn fetch(&self, source: &DataSource) -> Result<Vec<u8>, LoadError> {
        match source {
            DataSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| LoadError::Io {
                        path: path.clone(),
                        source,
                    })
            }
            DataSource::Url(url) => {
                let client = match &self.client {
                    Some(client) => client.clone(),
                    None => reqwest::Client::builder().build()?,
                };

                let response = client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url: url.clone(),
                        status,
                    });
                }

                Ok(response.bytes().await?.to_vec())
            }
        }
    }

    /// Parses CSV bytes into rows.
    ///
    /// Short rows are padded with empty values and surrounding whitespace
    /// is trimmed from every header and value.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the header row is absent or incomplete, or
    /// the CSV reader rejects the input.
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<CsvRow>, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(bytes);

        let csv_headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
            .collect();

        if csv_headers.iter().all(String::is_empty) {
            return Err(ParseError::NoHeader);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !csv_headers.iter().any(|h| h == *column))
            .map(|column| (*column).to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ParseError::MissingColumns { columns: missing });
        }

        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;

            let fields = csv_headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = record.get(i).unwrap_or("").trim().to_owned();
                    (header.clone(), value)
                })
                .collect();

            rows.push(CsvRow::new(fields));
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};

    use super::*;

    const SALES_CSV: &str = "\
pincode,city,state,device_type,quantity_sold
560001,Bengaluru,Karnataka,Smartphone,12
110001,New Delhi,Delhi,Laptop,4
";

    /// Serves one canned HTTP response on a loopback port and returns the
    /// URL to request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}/sales.csv")
    }

    fn loopback_loader() -> CsvLoader {
        CsvLoader::new().with_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    #[test]
    fn parses_rows_in_order() {
        let rows = CsvLoader::new().parse(SALES_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("pincode"), Some("560001"));
        assert_eq!(rows[1].get("city"), Some("New Delhi"));
    }

    #[test]
    fn trims_values_and_pads_short_rows() {
        let csv = "pincode , city,state,device_type,quantity_sold\n 560001 ,Bengaluru,Karnataka\n";
        let rows = CsvLoader::new().parse(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("pincode"), Some("560001"));
        assert_eq!(rows[0].get("device_type"), Some(""));
        assert_eq!(rows[0].get("quantity_sold"), Some(""));
    }

    #[test]
    fn extra_columns_are_kept() {
        let csv = "pincode,city,state,device_type,quantity_sold,region\n1,A,B,Tablet,2,South\n";
        let rows = CsvLoader::new().parse(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].get("region"), Some("South"));
    }

    #[test]
    fn strips_byte_order_mark() {
        let csv = "\u{feff}pincode,city,state,device_type,quantity_sold\n1,A,B,Tablet,2\n";
        let rows = CsvLoader::new().parse(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].get("pincode"), Some("1"));
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = CsvLoader::new().parse(b"").unwrap_err();
        assert!(matches!(err, ParseError::NoHeader));
    }

    #[test]
    fn headerless_input_is_missing_columns() {
        let csv = "560001,Bengaluru,Karnataka,Smartphone,12\n";
        let err = CsvLoader::new().parse(csv.as_bytes()).unwrap_err();
        match err {
            ParseError::MissingColumns { columns } => {
                assert_eq!(columns.len(), REQUIRED_COLUMNS.len());
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn reports_each_missing_column() {
        let csv = "pincode,city,state\n1,A,B\n";
        let err = CsvLoader::new().parse(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CSV header is missing required columns: device_type, quantity_sold"
        );
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let mut bytes = b"pincode,city,state,device_type,quantity_sold\n1,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",B,Tablet,2\n");
        let err = CsvLoader::new().parse(&bytes).unwrap_err();
        assert!(matches!(err, ParseError::Csv(_)));
    }

    #[test]
    fn tab_delimited_input() {
        let tsv = "pincode\tcity\tstate\tdevice_type\tquantity_sold\n1\tA\tB\tLaptop\t3\n";
        let rows = CsvLoader::new()
            .with_delimiter(b'\t')
            .parse(tsv.as_bytes())
            .unwrap();
        assert_eq!(rows[0].get("device_type"), Some("Laptop"));
    }

    #[test]
    fn data_source_detects_urls() {
        assert_eq!(
            DataSource::parse("https://example.com/sales.csv"),
            DataSource::Url("https://example.com/sales.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("data/sales.csv"),
            DataSource::Path(PathBuf::from("data/sales.csv"))
        );
    }

    #[tokio::test]
    async fn loads_local_file() {
        let path = std::env::temp_dir().join(format!(
            "pincode_sales_loader_{}.csv",
            std::process::id()
        ));
        tokio::fs::write(&path, SALES_CSV).await.unwrap();

        let rows = CsvLoader::new()
            .load(&DataSource::Path(path.clone()))
            .await
            .unwrap();
        tokio::fs::remove_file(&path).await.ok();

        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let source = DataSource::Path(PathBuf::from("/nonexistent/pincode_sales.csv"));
        let err = CsvLoader::new().load(&source).await.unwrap_err();
        assert!(matches!(err, LoaderError::Load(LoadError::Io { .. })));
    }

    #[tokio::test]
    async fn downloads_csv_over_http() {
        let url = serve_once("200 OK", SALES_CSV).await;
        let rows = loopback_loader()
            .load(&DataSource::Url(url))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("state"), Some("Karnataka"));
    }

    #[tokio::test]
    async fn http_error_status_is_a_load_error() {
        let url = serve_once("404 Not Found", "missing").await;
        let err = loopback_loader()
            .load(&DataSource::Url(url))
            .await
            .unwrap_err();
        match err {
            LoaderError::Load(LoadError::Status { status, .. }) => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
