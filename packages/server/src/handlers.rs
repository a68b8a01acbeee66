//! HTTP handler functions for the sales map API.

use actix_web::{HttpResponse, http::header::ContentType, web};
use pincode_sales_render::html;
use pincode_sales_server_models::{ApiError, ApiHealth};

use crate::AppState;

fn load_failed(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiError {
        error: message.to_string(),
    })
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/summary`
pub async fn summary(state: web::Data<AppState>) -> HttpResponse {
    match state.map() {
        Ok(map) => HttpResponse::Ok().json(&map.summary),
        Err(message) => load_failed(message),
    }
}

/// `GET /api/stats`
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    match state.map() {
        Ok(map) => HttpResponse::Ok().json(&map.stats),
        Err(message) => load_failed(message),
    }
}

/// `GET /api/markers`
///
/// Markers as a `GeoJSON` `FeatureCollection`.
pub async fn markers(state: web::Data<AppState>) -> HttpResponse {
    match state.map() {
        Ok(map) => HttpResponse::Ok()
            .content_type("application/geo+json")
            .body(map.markers_geojson.clone()),
        Err(message) => load_failed(message),
    }
}

/// `GET /`
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    match state.map() {
        Ok(map) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(map.page.clone()),
        Err(message) => HttpResponse::InternalServerError()
            .content_type(ContentType::html())
            .body(html::render_error_page(message)),
    }
}
