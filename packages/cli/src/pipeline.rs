//! Shared flows behind the CLI subcommands and the interactive menu.

use std::path::Path;
use std::time::Duration;

use pincode_sales_cli_utils::{GeocodeProgress, MultiProgress};
use pincode_sales_enrich::{EnrichOptions, LoadSession, SessionError, SessionOutput};
use pincode_sales_geocoder::service_registry::{self, GeocodingService};
use pincode_sales_geocoder::{Geocoder, OlaMapsGeocoder, ola};
use pincode_sales_loader::{CsvLoader, DataSource};
use pincode_sales_models::{GeocodeOutcome, LocationKey};
use pincode_sales_render::{MarkerLayer, SidebarStats};
use pincode_sales_server::AppState;

/// Everything needed to load one CSV.
pub struct LoadConfig {
    pub input: String,
    pub location_key: LocationKey,
    /// Overrides the service's `rate_limit_ms`.
    pub rate_limit_ms: Option<u64>,
    pub delimiter: u8,
    /// Geocoding service ID; the highest-priority one when `None`.
    pub service: Option<String>,
}

fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("pincode-sales/", env!("CARGO_PKG_VERSION")))
        .build()
}

fn resolve_service(id: Option<&str>) -> Result<GeocodingService, Box<dyn std::error::Error>> {
    service_registry::select_service(id).ok_or_else(|| match id {
        Some(id) => format!("Unknown or disabled geocoding service: {id}").into(),
        None => "No geocoding service is enabled".into(),
    })
}

fn geocoder(client: reqwest::Client, service: &GeocodingService) -> OlaMapsGeocoder {
    let credentials = ola::credentials_from_env();
    if credentials
        .as_ref()
        .and_then(|c| c.bearer_token.as_ref())
        .is_none()
    {
        log::warn!(
            "{} is not set; geocode requests will be sent without credentials",
            ola::BEARER_TOKEN_ENV
        );
    }
    OlaMapsGeocoder::from_service(client, service).with_credentials(credentials)
}

/// Loads and enriches `config.input`, collecting markers in a
/// [`MarkerLayer`].
///
/// The outer error covers setup (HTTP client, service lookup). The inner
/// one is a failed load, which callers report rather than abort on.
async fn load(
    multi: &MultiProgress,
    config: LoadConfig,
) -> Result<Result<(SessionOutput, MarkerLayer), SessionError>, Box<dyn std::error::Error>> {
    let client = http_client()?;
    let service = resolve_service(config.service.as_deref())?;
    let geocoder = geocoder(client.clone(), &service);

    let delay_ms = config.rate_limit_ms.unwrap_or_else(|| service.rate_limit_ms());
    let options = EnrichOptions::default()
        .with_location_key(config.location_key)
        .with_request_delay(Duration::from_millis(delay_ms));
    let loader = CsvLoader::new()
        .with_delimiter(config.delimiter)
        .with_client(client);

    let source = DataSource::parse(&config.input);
    log::info!("Loading {source} (geocoding via {})", service.name);

    let progress = GeocodeProgress::new(multi, "Loading sales data");
    let mut layer = MarkerLayer::new();
    let result = LoadSession::new(loader, options)
        .run(&source, &geocoder, &mut layer, &progress)
        .await;

    Ok(result.map(|output| (output, layer)))
}

/// Builds the map and writes it to `output_dir`.
///
/// # Errors
///
/// * If setup fails
/// * If the CSV cannot be loaded or parsed (after writing the error page
///   when `error_page` is set)
/// * If the output files cannot be written
pub async fn build_map(
    multi: &MultiProgress,
    config: LoadConfig,
    output_dir: &Path,
    error_page: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (output, layer) = match load(multi, config).await? {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("{e}");
            if error_page {
                let path = pincode_sales_render::write_error_page(output_dir, &e.to_string())?;
                println!("Error page written to {}", path.display());
            }
            return Err(e.into());
        }
    };

    let stats = SidebarStats::from_stats(&output.report.stats);
    let paths = pincode_sales_render::write_outputs(output_dir, &layer, &stats)?;

    println!();
    print!("{}", stats.to_text());
    println!();
    println!(
        "{} of {} records placed on the map ({} not found, {} skipped)",
        output.report.markers,
        output.report.records.len(),
        output.report.not_found,
        output.report.skipped
    );
    println!("Map written to {}", paths.page.display());

    Ok(())
}

/// Builds the map and serves it until the server is stopped. A failed load
/// is served as an error page.
///
/// # Errors
///
/// * If setup fails
/// * If the server cannot bind or crashes
pub async fn serve_map(
    multi: &MultiProgress,
    config: LoadConfig,
    bind_addr: String,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = match load(multi, config).await? {
        Ok((output, layer)) => AppState::ready(&output, &layer)?,
        Err(e) => {
            log::error!("{e}");
            AppState::failed(e.to_string())
        }
    };

    // actix-web runs its own runtime; keep it off the tokio worker.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(pincode_sales_server::run_server(
            state, bind_addr, port,
        ))
    })
    .await??;

    Ok(())
}

/// Looks up one pincode and prints its coordinates.
///
/// # Errors
///
/// * If setup fails
/// * If the lookup fails
pub async fn geocode_one(
    pincode: &str,
    service: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = resolve_service(service)?;
    let geocoder = geocoder(http_client()?, &service);

    match geocoder.resolve(pincode.trim()).await {
        GeocodeOutcome::Found {
            latitude,
            longitude,
        } => println!("{pincode}: {latitude}, {longitude}"),
        GeocodeOutcome::NotFound => println!("{pincode}: not found"),
        GeocodeOutcome::TransientError { message } => {
            return Err(format!("Lookup for {pincode} failed: {message}").into());
        }
    }

    Ok(())
}

/// Prints a table of all configured geocoding services.
pub fn list_services() {
    let services = service_registry::all_services();
    println!("{:<12} {:<20} {:<8} {:<9} BASE URL", "ID", "NAME", "ENABLED", "PRIORITY");
    println!("{}", "-".repeat(90));
    for s in &services {
        println!(
            "{:<12} {:<20} {:<8} {:<9} {}",
            s.id,
            s.name,
            s.enabled,
            s.priority,
            s.base_url()
        );
    }
}
