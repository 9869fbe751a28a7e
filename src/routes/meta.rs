use actix_web::{web, HttpResponse, Responder};
use crate::models::HealthResponse;
use super::AppState;

/// Configure metadata routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/version", web::get().to(version))
        .route("/threshold", web::get().to(threshold));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: state.service.version.clone(),
        model_id: state.models.current().id.clone(),
        timestamp: chrono::Utc::now(),
    })
}

/// API version, as a JSON string literal
async fn version(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&state.service.version)
}

/// Decision threshold, as a JSON string literal
async fn threshold(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&state.service.threshold)
}
