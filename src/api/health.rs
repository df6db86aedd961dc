//! Health check endpoint
//!
//! Answers from local identity only, so peers and the hub can probe this
//! instance directly even before registration and with no hub at all.

use actix_web::{get, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::ServiceIdentity;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub capabilities: Vec<String>,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(identity: &ServiceIdentity) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
            service: identity.name.clone(),
            capabilities: identity.capabilities.clone(),
            version: identity.version.clone(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub identity: ServiceIdentity,
}

impl AppState {
    pub fn new(identity: ServiceIdentity) -> Self {
        Self { identity }
    }
}

/// Health check endpoint
#[get("/api/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy(&state.identity))
}

/// Configure health routes
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
}
