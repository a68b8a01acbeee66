#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the pincode sales map.
//!
//! Serves one finished load read-only: the Leaflet page at `/`, the sidebar
//! statistics and marker `GeoJSON` under `/api`. A load that failed is
//! served too, as an error page and error responses carrying the message.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use pincode_sales_enrich::SessionOutput;
use pincode_sales_render::{MarkerLayer, RenderError, SidebarStats};
use pincode_sales_server_models::ApiSummary;

/// Default bind address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default port when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8080;

/// Everything rendered from a successful load.
#[derive(Debug, Clone)]
pub struct LoadedMap {
    /// Outcome of the load.
    pub summary: ApiSummary,
    /// Sidebar statistics served at `/api/stats`.
    pub stats: SidebarStats,
    /// Serialized marker `FeatureCollection`.
    pub markers_geojson: String,
    /// Rendered map page.
    pub page: String,
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    map: Result<LoadedMap, String>,
}

impl AppState {
    /// State for a load that completed.
    ///
    /// # Errors
    ///
    /// * If the markers or the page fail to render
    pub fn ready(output: &SessionOutput, layer: &MarkerLayer) -> Result<Self, RenderError> {
        let report = &output.report;
        let stats = SidebarStats::from_stats(&report.stats);

        let summary = ApiSummary {
            source: output.source.to_string(),
            rows: output.rows,
            valid: report.records.len(),
            invalid: report.invalid,
            markers: report.markers,
            not_found: report.not_found,
            skipped: report.skipped,
            elapsed_ms: u64::try_from(output.elapsed.as_millis()).unwrap_or(u64::MAX),
        };

        Ok(Self {
            map: Ok(LoadedMap {
                summary,
                markers_geojson: pincode_sales_render::markers_geojson(layer.markers())?,
                page: pincode_sales_render::page(layer.markers(), &stats)?,
                stats,
            }),
        })
    }

    /// State for a load that failed with `message`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            map: Err(message.into()),
        }
    }

    /// The rendered map, or the error message of a failed load.
    ///
    /// # Errors
    ///
    /// * If the load failed
    pub fn map(&self) -> Result<&LoadedMap, &str> {
        self.map.as_ref().map_err(String::as_str)
    }
}

/// Reads `BIND_ADDR` and `PORT`, falling back to `127.0.0.1:8080`.
#[must_use]
pub fn bind_from_env() -> (String, u16) {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    (bind_addr, port)
}

/// Registers every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/summary", web::get().to(handlers::summary))
            .route("/stats", web::get().to(handlers::stats))
            .route("/markers", web::get().to(handlers::markers)),
    )
    .route("/", web::get().to(handlers::index));
}

/// Serves `state` on `bind_addr:port` until shut down.
///
/// # Errors
///
/// * If the address cannot be bound
#[allow(clippy::future_not_send)]
pub async fn run_server(state: AppState, bind_addr: String, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(state);

    log::info!("Starting server on http://{bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
