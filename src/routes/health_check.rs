use actix_web::{http::header, web, HttpResponse};
use serde::Serialize;

use crate::configuration::ApplicationSettings;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app_name: String,
    pub environment: String,
    pub version: String,
}

/// GET /health
///
/// Liveness plus a little metadata; never cached.
pub async fn health_check(settings: web::Data<ApplicationSettings>) -> HttpResponse {
    tracing::debug!("Health check endpoint called");

    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(HealthResponse {
            status: "ok",
            app_name: settings.name.clone(),
            environment: settings.environment.clone(),
            version: settings.api_version.clone(),
        })
}
